#[cfg(test)]
pub mod memory;
pub mod queries;
pub mod sqlite;

use crate::planner::{Catalog, PlanStore, PlannerState, RangeRegistry, WeekendKey};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use sqlite::SqliteStore;

pub const COLUMNS_DATA_KEY: &str = "planner.columnsData";
pub const RANGES_KEY: &str = "planner.ranges";
pub const CURRENT_WEEKEND_KEY: &str = "planner.currentWeekendKey";
pub const AVAILABLE_ACTIVITIES_KEY: &str = "planner.availableActivities";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

pub fn hydrate<S: KeyValueStore>(store: &S) -> PlannerState {
    let plan: PlanStore = read_json(store, COLUMNS_DATA_KEY).unwrap_or_default();
    let ranges: RangeRegistry = read_json(store, RANGES_KEY).unwrap_or_default();
    let catalog: Catalog = read_json(store, AVAILABLE_ACTIVITIES_KEY).unwrap_or_default();
    let current_weekend_key = read_raw(store, CURRENT_WEEKEND_KEY).and_then(|raw| {
        raw.trim()
            .parse::<WeekendKey>()
            .inspect_err(|err| warn!(key = CURRENT_WEEKEND_KEY, error = %err, "ignoring stored weekend key"))
            .ok()
    });

    debug!(
        planned_days = plan.planned_days(),
        ranges = ranges.len(),
        catalog = catalog.activities().len(),
        "planner state hydrated"
    );

    PlannerState::from_parts(plan, ranges, catalog, current_weekend_key)
}

fn read_raw<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    store
        .get(key)
        .inspect_err(|err| warn!(key, error = %err, "failed to read stored value"))
        .ok()
        .flatten()
}

fn read_json<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let raw = read_raw(store, key)?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Stored value for {key} is not valid"))
        .inspect_err(|err| warn!(key, error = %err, "ignoring stored value"))
        .ok()
}

pub struct Persister<S> {
    store: S,
}

impl<S: KeyValueStore> Persister<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observe(&mut self, previous: &PlannerState, next: &PlannerState) {
        if previous.plan() != next.plan() {
            self.write_json(COLUMNS_DATA_KEY, next.plan());
        }
        if previous.ranges() != next.ranges() {
            self.write_json(RANGES_KEY, next.ranges());
        }
        if previous.catalog() != next.catalog() {
            self.write_json(AVAILABLE_ACTIVITIES_KEY, next.catalog());
        }
        match next.current_weekend_key() {
            Some(key) if previous.current_weekend_key() != Some(key) => {
                self.write(CURRENT_WEEKEND_KEY, &key.to_string());
            }
            _ => {}
        }
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(encoded) => self.write(key, &encoded),
            Err(err) => warn!(key, error = %err, "failed to encode planner state"),
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            warn!(key, error = %err, "failed to persist planner state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use crate::planner::{ActivityDraft, DateRange, DayKey};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn empty_store_hydrates_defaults() {
        let state = hydrate(&MemoryStore::default());

        assert!(state.plan().planned_days() == 0);
        assert!(state.ranges().is_empty());
        assert_eq!(state.catalog(), &Catalog::default());
        assert_eq!(state.current_weekend_key(), None);
    }

    #[test]
    fn corrupt_key_falls_back_without_affecting_others() {
        let store = MemoryStore::default()
            .with(COLUMNS_DATA_KEY, "{not json")
            .with(RANGES_KEY, r#"{"2024-5-1":{"start":"2024-06-01","end":"2024-06-03"}}"#)
            .with(AVAILABLE_ACTIVITIES_KEY, r#"{"act-1":"not an array"}"#)
            .with(CURRENT_WEEKEND_KEY, "2024-5-1");

        let state = hydrate(&store);
        assert_eq!(state.plan(), &PlanStore::default());
        assert_eq!(state.catalog(), &Catalog::default());
        assert_eq!(state.ranges().len(), 1);
        assert_eq!(
            state.current_weekend_key().map(|key| key.saturday()),
            Some(date(2024, 6, 1))
        );
    }

    #[test]
    fn rfc3339_range_bounds_are_accepted() {
        let store = MemoryStore::default().with(
            RANGES_KEY,
            r#"{"2024-5-1":{"start":"2024-06-01T12:00:00Z","end":"2024-06-02T12:00:00Z"}}"#,
        );

        let state = hydrate(&store);
        assert_eq!(state.ranges().len(), 1);
    }

    #[test]
    fn non_saturday_weekend_key_is_ignored() {
        let store = MemoryStore::default().with(CURRENT_WEEKEND_KEY, "2024-5-2");
        assert_eq!(hydrate(&store).current_weekend_key(), None);
    }

    #[test]
    fn observe_writes_only_changed_slices() {
        let before = hydrate(&MemoryStore::default());
        let after = before.select_range(DateRange::weekend(date(2024, 6, 1)));

        let mut persister = Persister::new(MemoryStore::default());
        persister.observe(&before, &after);

        let store = persister.store();
        assert!(store.values.contains_key(RANGES_KEY));
        assert_eq!(
            store.values.get(CURRENT_WEEKEND_KEY).map(String::as_str),
            Some("2024-5-1")
        );
        assert!(!store.values.contains_key(COLUMNS_DATA_KEY));
        assert!(!store.values.contains_key(AVAILABLE_ACTIVITIES_KEY));
        assert_eq!(store.writes, 2);

        persister.observe(&after, &after);
        assert_eq!(persister.store().writes, 2);
    }

    #[test]
    fn persisted_state_hydrates_back() {
        let saturday = date(2024, 6, 1);
        let initial = hydrate(&MemoryStore::default());
        let state = initial
            .select_range(DateRange::new(saturday, date(2024, 6, 3)).expect("range"))
            .add_from_catalog("act-2", DayKey::from_date(saturday))
            .expect("placed")
            .add_to_catalog(ActivityDraft {
                title: "Farmers market".to_string(),
                description: "Pick up vegetables".to_string(),
                ..ActivityDraft::default()
            })
            .expect("catalog entry");

        let mut persister = Persister::new(MemoryStore::default());
        persister.observe(&initial, &state);

        let restored = hydrate(persister.store());
        assert_eq!(restored.plan(), state.plan());
        assert_eq!(restored.ranges(), state.ranges());
        assert_eq!(restored.catalog(), state.catalog());
        assert_eq!(restored.current_weekend_key(), state.current_weekend_key());
    }

    #[test]
    fn write_failures_are_swallowed() {
        let before = hydrate(&MemoryStore::default());
        let after = before.select_range(DateRange::weekend(date(2024, 6, 1)));

        let mut persister = Persister::new(MemoryStore::failing());
        persister.observe(&before, &after);

        assert!(persister.store().values.is_empty());
        assert_eq!(persister.store().writes, 0);
    }
}
