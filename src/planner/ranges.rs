use crate::planner::day_key::{WeekendKey, anchor_saturday, within_planning_window};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Range start {start} is after its end {end}");
        }
        if let Some(bound) = [start, end].into_iter().find(|bound| !within_planning_window(*bound)) {
            bail!("Range bound {bound} is outside the supported calendar");
        }

        Ok(Self { start, end })
    }

    pub fn weekend(saturday: NaiveDate) -> Self {
        Self {
            start: saturday,
            end: saturday + Duration::days(1),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|date| *date <= self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        !(other.end < self.start || other.start > self.end)
    }
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    start: String,
    end: String,
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawRange {
            start: self.start.format("%Y-%m-%d").to_string(),
            end: self.end.format("%Y-%m-%d").to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRange::deserialize(deserializer)?;
        let start = parse_bound(&raw.start).map_err(serde::de::Error::custom)?;
        let end = parse_bound(&raw.end).map_err(serde::de::Error::custom)?;

        DateRange::new(start, end).map_err(serde::de::Error::custom)
    }
}

pub fn parse_bound(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").or_else(|_| {
        DateTime::parse_from_rfc3339(raw)
            .map(|timestamp| timestamp.with_timezone(&Local).date_naive())
            .with_context(|| format!("Invalid range bound: {raw}"))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeRegistry {
    entries: BTreeMap<WeekendKey, DateRange>,
}

impl RangeRegistry {
    pub fn define_range(&self, range: DateRange) -> Self {
        let mut next = self.evict_overlapping(range);
        covering_keys(&range).into_iter().for_each(|key| {
            next.entries.insert(key, range);
        });

        next
    }

    pub fn resolve(&self, key: &WeekendKey) -> Option<DateRange> {
        self.entries.get(key).copied()
    }

    pub fn all_entries(&self) -> &BTreeMap<WeekendKey, DateRange> {
        &self.entries
    }

    pub fn evict_overlapping(&self, range: DateRange) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(key, existing)| {
                let evict = existing.overlaps(&range) && **existing != range;
                if evict {
                    debug!(weekend = %key, start = %existing.start(), end = %existing.end(), "evicting overlapping range");
                }
                !evict
            })
            .map(|(key, existing)| (*key, *existing))
            .collect::<BTreeMap<_, _>>();

        Self { entries }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.entries.values().any(|range| range.contains(date))
    }

    pub fn legend(&self) -> Vec<(DateRange, Vec<WeekendKey>)> {
        self.entries
            .iter()
            .fold(BTreeMap::new(), |mut acc, (key, range)| {
                acc.entry((range.start(), range.end()))
                    .or_insert_with(|| (*range, Vec::new()))
                    .1
                    .push(*key);
                acc
            })
            .into_values()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// A range whose own anchor lies past its end is indexed one week back.
pub fn covering_keys(range: &DateRange) -> Vec<WeekendKey> {
    let mut saturday = anchor_saturday(range.start());
    if saturday > range.end() {
        saturday -= Duration::days(7);
    }

    let mut keys = Vec::new();
    while saturday <= range.end() {
        keys.push(WeekendKey::of(saturday));
        saturday += Duration::days(7);
    }

    keys
}
