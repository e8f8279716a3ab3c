use crate::planner::activity::{Activity, Column};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        activity_id: String,
        preview: Option<Activity>,
    },
}

impl DragState {
    pub fn dragged_id(&self) -> Option<&str> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { activity_id, .. } => Some(activity_id.as_str()),
        }
    }

    pub fn preview(&self) -> Option<&Activity> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { preview, .. } => preview.as_ref(),
        }
    }
}

pub fn on_drag_start(columns: &[Column], dragged_id: &str) -> Option<Activity> {
    columns
        .iter()
        .flat_map(|column| column.activities.iter())
        .find(|activity| activity.id == dragged_id)
        .cloned()
}

pub fn on_drag_over(columns: &[Column], dragged_id: &str, over_id: Option<&str>) -> Vec<Column> {
    let Some(over_id) = over_id else {
        return columns.to_vec();
    };
    let Some(source) = column_holding(columns, dragged_id) else {
        debug!(dragged = dragged_id, "drag over ignored: dragged activity not in any column");
        return columns.to_vec();
    };
    let Some(destination) = destination_column(columns, over_id) else {
        debug!(over = over_id, "drag over ignored: unknown drop target");
        return columns.to_vec();
    };
    if source == destination {
        return columns.to_vec();
    }

    let mut next = columns.to_vec();
    let Some(from) = next[source].position(dragged_id) else {
        return columns.to_vec();
    };
    let moved = next[source].activities.remove(from);

    let target = &mut next[destination];
    let insert_at = target.position(over_id).unwrap_or(target.activities.len());
    target.activities.insert(insert_at, moved);

    next
}

pub fn on_drag_end(columns: &[Column], dragged_id: &str, over_id: Option<&str>) -> Vec<Column> {
    let Some(over_id) = over_id.filter(|over_id| *over_id != dragged_id) else {
        return columns.to_vec();
    };
    let Some(index) = column_holding(columns, dragged_id) else {
        return columns.to_vec();
    };

    let column = &columns[index];
    let (Some(from), Some(to)) = (column.position(dragged_id), column.position(over_id)) else {
        return columns.to_vec();
    };

    let mut next = columns.to_vec();
    array_move(&mut next[index].activities, from, to);
    next
}

fn column_holding(columns: &[Column], activity_id: &str) -> Option<usize> {
    columns.iter().position(|column| column.contains(activity_id))
}

fn destination_column(columns: &[Column], over_id: &str) -> Option<usize> {
    columns
        .iter()
        .position(|column| column.matches(over_id))
        .or_else(|| column_holding(columns, over_id))
}

fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }

    let item = items.remove(from);
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::activity::Category;
    use chrono::NaiveDate;

    fn activity(id: &str) -> Activity {
        Activity {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            duration: "1 hour".to_string(),
            category: Category::Outdoors,
            location: String::new(),
        }
    }

    fn columns(saturday: &[&str], sunday: &[&str]) -> Vec<Column> {
        let sat = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let sun = NaiveDate::from_ymd_opt(2024, 6, 2).expect("valid date");
        vec![
            Column::for_day(sat, saturday.iter().map(|id| activity(id)).collect()),
            Column::for_day(sun, sunday.iter().map(|id| activity(id)).collect()),
        ]
    }

    fn ids(column: &Column) -> Vec<&str> {
        column.activities.iter().map(|a| a.id.as_str()).collect()
    }

    fn total(columns: &[Column]) -> usize {
        columns.iter().map(|column| column.activities.len()).sum()
    }

    #[test]
    fn drag_start_finds_preview() {
        let columns = columns(&["a"], &["b"]);
        assert_eq!(on_drag_start(&columns, "b").map(|a| a.title), Some("B".to_string()));
        assert_eq!(on_drag_start(&columns, "zzz"), None);
    }

    #[test]
    fn drag_over_activity_inserts_before_it() {
        let before = columns(&["a", "x"], &["b", "c"]);
        let after = on_drag_over(&before, "a", Some("c"));

        assert_eq!(ids(&after[0]), vec!["x"]);
        assert_eq!(ids(&after[1]), vec!["b", "a", "c"]);
        assert_eq!(total(&after), total(&before));
    }

    #[test]
    fn drag_over_column_appends() {
        let before = columns(&["a"], &["b"]);
        let after = on_drag_over(&before, "a", Some("2024-5-2"));

        assert!(after[0].activities.is_empty());
        assert_eq!(ids(&after[1]), vec!["b", "a"]);
    }

    #[test]
    fn drag_over_is_idempotent_for_repeated_target() {
        let before = columns(&["a"], &["b"]);
        let once = on_drag_over(&before, "a", Some("b"));
        let twice = on_drag_over(&once, "a", Some("b"));
        assert_eq!(once, twice);
    }

    #[test]
    fn drag_over_same_column_or_unknown_target_is_unchanged() {
        let before = columns(&["a", "b"], &["c"]);
        assert_eq!(on_drag_over(&before, "a", Some("b")), before);
        assert_eq!(on_drag_over(&before, "a", Some("2024-5-1")), before);
        assert_eq!(on_drag_over(&before, "a", Some("nowhere")), before);
        assert_eq!(on_drag_over(&before, "a", None), before);
        assert_eq!(on_drag_over(&before, "ghost", Some("c")), before);
    }

    #[test]
    fn drag_end_reorders_within_column() {
        let before = columns(&["a", "b", "c", "d"], &[]);
        let after = on_drag_end(&before, "a", Some("c"));

        assert_eq!(ids(&after[0]), vec!["b", "c", "a", "d"]);
        assert_eq!(after[0].activities.len(), 4);

        let back = on_drag_end(&after, "a", Some("b"));
        assert_eq!(ids(&back[0]), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn drag_end_ignores_cross_column_missing_and_self_targets() {
        let before = columns(&["a", "b"], &["c"]);
        assert_eq!(on_drag_end(&before, "a", Some("c")), before);
        assert_eq!(on_drag_end(&before, "a", Some("a")), before);
        assert_eq!(on_drag_end(&before, "a", None), before);
        assert_eq!(on_drag_end(&before, "a", Some("2024-5-1")), before);
    }
}
