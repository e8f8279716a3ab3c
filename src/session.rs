use crate::planner::PlannerState;
use crate::storage::{KeyValueStore, Persister, hydrate};
use anyhow::Result;
use chrono::NaiveDate;

pub struct PlannerSession<S> {
    state: PlannerState,
    persister: Persister<S>,
}

impl<S: KeyValueStore> PlannerSession<S> {
    pub fn open(store: S, today: NaiveDate) -> Self {
        let hydrated = hydrate(&store);
        let restored = hydrated.restore_selection(today);

        let mut persister = Persister::new(store);
        persister.observe(&hydrated, &restored);

        Self {
            state: restored,
            persister,
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        self.persister.store()
    }

    pub fn apply<F>(&mut self, change: F) -> &PlannerState
    where
        F: FnOnce(&PlannerState) -> PlannerState,
    {
        let next = change(&self.state);
        self.commit(next)
    }

    pub fn try_apply<F>(&mut self, change: F) -> Result<&PlannerState>
    where
        F: FnOnce(&PlannerState) -> Result<PlannerState>,
    {
        let next = change(&self.state)?;
        Ok(self.commit(next))
    }

    fn commit(&mut self, next: PlannerState) -> &PlannerState {
        self.persister.observe(&self.state, &next);
        self.state = next;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{DateRange, DayKey};
    use crate::storage::memory::MemoryStore;
    use crate::storage::{COLUMNS_DATA_KEY, CURRENT_WEEKEND_KEY, RANGES_KEY, SqliteStore};
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn first_open_selects_upcoming_weekend_and_persists_it() {
        let session = PlannerSession::open(MemoryStore::default(), date(2024, 6, 5));

        assert_eq!(
            session.state().selection(),
            Some(DateRange::weekend(date(2024, 6, 8)))
        );
        assert_eq!(session.state().columns().len(), 2);
        assert_eq!(
            session.store().values.get(CURRENT_WEEKEND_KEY).map(String::as_str),
            Some("2024-5-8")
        );
        assert!(session.store().values.contains_key(RANGES_KEY));
    }

    #[test]
    fn reopening_restores_remembered_long_weekend() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("planner.db");
        let long = DateRange::new(date(2024, 5, 25), date(2024, 5, 27)).expect("range");

        {
            let store = SqliteStore::open(&path).expect("open");
            let mut session = PlannerSession::open(store, date(2024, 5, 20));
            session.apply(|state| state.select_range(long));
            session
                .try_apply(|state| state.add_from_catalog("act-3", DayKey::from_date(date(2024, 5, 27))))
                .expect("placed");
        }

        let store = SqliteStore::open(&path).expect("reopen");
        let session = PlannerSession::open(store, date(2024, 7, 1));
        assert_eq!(session.state().selection(), Some(long));
        assert_eq!(session.state().columns().len(), 3);
        assert_eq!(session.state().columns()[2].activities.len(), 1);
    }

    #[test]
    fn failed_change_leaves_state_and_store_untouched() {
        let mut session = PlannerSession::open(MemoryStore::default(), date(2024, 6, 5));
        let before = session.state().clone();
        let writes = session.store().writes;

        let result = session.try_apply(|state| {
            state.add_from_catalog("missing", DayKey::from_date(date(2024, 6, 8)))
        });

        assert!(result.is_err());
        assert_eq!(session.state(), &before);
        assert_eq!(session.store().writes, writes);
    }

    #[test]
    fn storage_failures_do_not_block_changes() {
        let mut session = PlannerSession::open(MemoryStore::failing(), date(2024, 6, 5));
        let saturday = DayKey::from_date(date(2024, 6, 8));

        session
            .try_apply(|state| state.add_from_catalog("act-1", saturday))
            .expect("placed in memory");

        assert_eq!(session.state().plan().activities_for(&saturday).len(), 1);
        assert!(!session.store().values.contains_key(COLUMNS_DATA_KEY));
    }
}
