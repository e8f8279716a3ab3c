pub mod activity;
pub mod day_key;
pub mod dnd;
pub mod navigator;
pub mod plan;
pub mod ranges;
pub mod state;

pub use activity::{Activity, ActivityDraft, Category, Column};
pub use day_key::{DayKey, WeekendKey};
pub use plan::{Catalog, PlanStore};
pub use ranges::{DateRange, RangeRegistry};
pub use state::PlannerState;
