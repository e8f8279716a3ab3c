use crate::lookup::places::PlaceCandidate;
use crate::planner::activity::{Activity, ActivityDraft, Column};
use crate::planner::day_key::{DayKey, WeekendKey};
use crate::planner::dnd::{self, DragState};
use crate::planner::navigator::WeekendNavigator;
use crate::planner::plan::{Catalog, PlanStore};
use crate::planner::ranges::{DateRange, RangeRegistry};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerState {
    plan: PlanStore,
    ranges: RangeRegistry,
    catalog: Catalog,
    current_weekend_key: Option<WeekendKey>,
    selection: Option<DateRange>,
    columns: Vec<Column>,
    drag: DragState,
}

impl PlannerState {
    pub fn from_parts(
        plan: PlanStore,
        ranges: RangeRegistry,
        catalog: Catalog,
        current_weekend_key: Option<WeekendKey>,
    ) -> Self {
        Self {
            plan,
            ranges,
            catalog,
            current_weekend_key,
            ..Self::default()
        }
    }

    pub fn plan(&self) -> &PlanStore {
        &self.plan
    }

    pub fn ranges(&self) -> &RangeRegistry {
        &self.ranges
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_weekend_key(&self) -> Option<WeekendKey> {
        self.current_weekend_key
    }

    pub fn selection(&self) -> Option<DateRange> {
        self.selection
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn navigator(&self) -> WeekendNavigator<'_> {
        WeekendNavigator::new(&self.ranges)
    }

    pub fn find_activity(&self, activity_id: &str) -> Option<&Activity> {
        self.plan
            .find_activity(activity_id)
            .or_else(|| self.catalog.get(activity_id))
    }

    pub fn restore_selection(&self, today: NaiveDate) -> Self {
        match self.current_weekend_key {
            Some(key) => match self.ranges.resolve(&key) {
                Some(range) => self.show(range),
                None => self.select_range(DateRange::weekend(key.saturday())),
            },
            None => self.select_range(self.navigator().upcoming(today)),
        }
    }

    pub fn select_range(&self, range: DateRange) -> Self {
        info!(start = %range.start(), end = %range.end(), "weekend range selected");
        Self {
            ranges: self.ranges.define_range(range),
            ..self.show(range)
        }
    }

    pub fn previous(&self) -> Self {
        match self.navigator().previous(self.selection.as_ref()) {
            Some(range) => self.select_range(range),
            None => self.clone(),
        }
    }

    pub fn next(&self) -> Self {
        match self.navigator().next(self.selection.as_ref()) {
            Some(range) => self.select_range(range),
            None => self.clone(),
        }
    }

    pub fn set_columns(&self, columns: Vec<Column>) -> Self {
        Self {
            plan: self.plan.commit_columns(&columns),
            columns,
            ..self.clone()
        }
    }

    pub fn add_activity(&self, activity: &Activity, column_id: DayKey) -> Self {
        self.with_plan(self.plan.add_activity(activity, column_id))
    }

    pub fn add_from_catalog(&self, catalog_id: &str, column_id: DayKey) -> Result<Self> {
        let activity = self
            .catalog
            .get(catalog_id)
            .with_context(|| format!("No catalog activity with id: {catalog_id}"))?;

        Ok(self.add_activity(activity, column_id))
    }

    pub fn edit_activity(&self, activity_id: &str, replacement: &Activity) -> Self {
        Self {
            catalog: self.catalog.edit(activity_id, replacement),
            ..self.with_plan(self.plan.edit_activity(activity_id, replacement))
        }
    }

    pub fn delete_activity(&self, activity_id: &str) -> Self {
        self.with_plan(self.plan.delete_activity(activity_id))
    }

    pub fn add_to_catalog(&self, draft: ActivityDraft) -> Result<Self> {
        Ok(Self {
            catalog: self.catalog.add(draft)?,
            ..self.clone()
        })
    }

    pub fn delete_from_catalog(&self, activity_id: &str) -> Self {
        Self {
            catalog: self.catalog.delete(activity_id),
            ..self.clone()
        }
    }

    pub fn add_place(&self, candidate: &PlaceCandidate, column_id: Option<DayKey>) -> Self {
        let Some(target) = column_id.or_else(|| self.columns.first().map(|column| column.id))
        else {
            debug!(place = %candidate.id, "no column to place candidate into");
            return self.clone();
        };

        self.add_activity(&candidate.to_activity(), target)
    }

    pub fn drag_start(&self, activity_id: &str) -> Self {
        Self {
            drag: DragState::Dragging {
                activity_id: activity_id.to_string(),
                preview: dnd::on_drag_start(&self.columns, activity_id),
            },
            ..self.clone()
        }
    }

    pub fn drag_over(&self, over_id: Option<&str>) -> Self {
        let Some(dragged) = self.drag.dragged_id() else {
            debug!("drag over ignored: no active drag");
            return self.clone();
        };

        let columns = dnd::on_drag_over(&self.columns, dragged, over_id);
        if columns == self.columns {
            return self.clone();
        }

        self.set_columns(columns)
    }

    pub fn drag_end(&self, over_id: Option<&str>) -> Self {
        let Some(dragged) = self.drag.dragged_id() else {
            return self.clone();
        };

        let columns = dnd::on_drag_end(&self.columns, dragged, over_id);
        let next = if columns == self.columns {
            self.clone()
        } else {
            self.set_columns(columns)
        };

        Self {
            drag: DragState::Idle,
            ..next
        }
    }

    pub fn drag_cancel(&self) -> Self {
        Self {
            drag: DragState::Idle,
            ..self.clone()
        }
    }

    fn show(&self, range: DateRange) -> Self {
        Self {
            current_weekend_key: Some(WeekendKey::of(range.start())),
            selection: Some(range),
            columns: self.plan.materialize_columns(&range),
            ..self.clone()
        }
    }

    fn with_plan(&self, plan: PlanStore) -> Self {
        let columns = self
            .selection
            .map(|range| plan.materialize_columns(&range))
            .unwrap_or_default();

        Self {
            plan,
            columns,
            ..self.clone()
        }
    }
}
