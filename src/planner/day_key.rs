use anyhow::{Context, Result, bail};
use chrono::{Datelike, Days, Duration, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// Four weeks of headroom keeps weekend anchoring and week stepping
// representable on either side of a planned date.
const PLANNING_MARGIN_DAYS: u64 = 28;

static DAY_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d{1,6})-(\d{1,2})-(\d{1,2})$").expect("day-key pattern compiles")
});

// `YEAR-MONTH_INDEX-DAY`, zero-based month, no padding: June 1st 2024 is `2024-5-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month_index(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year(), self.month_index(), self.day())
    }
}

impl FromStr for DayKey {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let captures = DAY_KEY_PATTERN
            .captures(raw.trim())
            .with_context(|| format!("Invalid day key: {raw}. Example: 2024-5-1"))?;

        let year = captures[1]
            .parse::<i32>()
            .with_context(|| format!("Invalid day key year: {raw}"))?;
        let month_index = captures[2]
            .parse::<u32>()
            .with_context(|| format!("Invalid day key month: {raw}"))?;
        let day = captures[3]
            .parse::<u32>()
            .with_context(|| format!("Invalid day key day: {raw}"))?;

        NaiveDate::from_ymd_opt(year, month_index + 1, day)
            .map(Self)
            .with_context(|| format!("Day key does not name a calendar day: {raw}"))
    }
}

impl Serialize for DayKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekendKey(DayKey);

impl WeekendKey {
    pub fn of(date: NaiveDate) -> Self {
        Self(DayKey::from_date(anchor_saturday(date)))
    }

    pub fn saturday(&self) -> NaiveDate {
        self.0.date()
    }
}

impl fmt::Display for WeekendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WeekendKey {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let day_key = raw.parse::<DayKey>()?;
        if day_key.date().weekday() != Weekday::Sat {
            bail!("Weekend key must name a Saturday: {raw}");
        }
        if !within_planning_window(day_key.date()) {
            bail!("Weekend key is outside the supported calendar: {raw}");
        }

        Ok(Self(day_key))
    }
}

impl Serialize for WeekendKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekendKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub fn within_planning_window(date: NaiveDate) -> bool {
    date.checked_sub_days(Days::new(PLANNING_MARGIN_DAYS)).is_some()
        && date.checked_add_days(Days::new(PLANNING_MARGIN_DAYS)).is_some()
}

pub fn anchor_saturday(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date,
        Weekday::Sun => date - Duration::days(1),
        weekday => date + Duration::days(i64::from(5 - weekday.num_days_from_monday())),
    }
}

pub fn saturday_on_or_before(date: NaiveDate) -> NaiveDate {
    let back = (date.weekday().num_days_from_sunday() + 1) % 7;
    date - Duration::days(i64::from(back))
}

pub fn saturday_on_or_after(date: NaiveDate) -> NaiveDate {
    let ahead = 6 - date.weekday().num_days_from_sunday();
    date + Duration::days(i64::from(ahead))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn day_key_uses_zero_based_month_without_padding() {
        let key = DayKey::from_date(date(2024, 6, 1));
        assert_eq!(key.to_string(), "2024-5-1");
        assert_eq!(key.month_index(), 5);
        assert_eq!("2024-5-1".parse::<DayKey>().expect("parse"), key);
    }

    #[test]
    fn day_key_rejects_garbage_and_impossible_days() {
        assert!("2024-06-01T00:00".parse::<DayKey>().is_err());
        assert!("2024-12-1".parse::<DayKey>().is_err());
        assert!("2024-1-30".parse::<DayKey>().is_err());
    }

    #[test]
    fn day_key_round_trips_as_json_map_key() {
        let map = std::collections::BTreeMap::from([(DayKey::from_date(date(2024, 1, 5)), 1)]);
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"2024-0-5":1}"#);
        let back: std::collections::BTreeMap<DayKey, i32> =
            serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, map);
    }

    #[test]
    fn weekend_key_is_shared_by_saturday_and_sunday() {
        let saturday = WeekendKey::of(date(2024, 6, 1));
        let sunday = WeekendKey::of(date(2024, 6, 2));
        assert_eq!(saturday, sunday);
        assert_eq!(saturday.to_string(), "2024-5-1");
        assert_eq!(WeekendKey::of(saturday.saturday()), saturday);
    }

    #[test]
    fn weekdays_map_to_the_next_saturday() {
        for day in 3..=7 {
            assert_eq!(WeekendKey::of(date(2024, 6, day)).saturday(), date(2024, 6, 8));
        }
    }

    #[test]
    fn weekend_key_must_be_a_saturday() {
        assert!("2024-5-2".parse::<WeekendKey>().is_err());
        assert!("2024-5-1".parse::<WeekendKey>().is_ok());
    }

    #[test]
    fn planning_window_excludes_calendar_edges() {
        assert!(within_planning_window(date(2024, 6, 1)));
        assert!(!within_planning_window(NaiveDate::MAX));
        assert!(!within_planning_window(NaiveDate::MIN));

        let last_saturday = saturday_on_or_before(NaiveDate::MAX);
        assert!(
            DayKey::from_date(last_saturday)
                .to_string()
                .parse::<WeekendKey>()
                .is_err()
        );
    }

    #[test]
    fn saturday_search_helpers() {
        assert_eq!(saturday_on_or_before(date(2024, 6, 2)), date(2024, 6, 1));
        assert_eq!(saturday_on_or_before(date(2024, 6, 7)), date(2024, 6, 1));
        assert_eq!(saturday_on_or_before(date(2024, 6, 1)), date(2024, 6, 1));
        assert_eq!(saturday_on_or_after(date(2024, 6, 2)), date(2024, 6, 8));
        assert_eq!(saturday_on_or_after(date(2024, 6, 1)), date(2024, 6, 1));
    }
}
