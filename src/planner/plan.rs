use crate::planner::activity::{Activity, ActivityDraft, Column, default_catalog};
use crate::planner::day_key::DayKey;
use crate::planner::ranges::DateRange;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanStore {
    days: BTreeMap<DayKey, Vec<Activity>>,
}

impl PlanStore {
    pub fn materialize_columns(&self, range: &DateRange) -> Vec<Column> {
        range
            .dates()
            .map(|date| {
                let activities = self
                    .days
                    .get(&DayKey::from_date(date))
                    .cloned()
                    .unwrap_or_default();
                Column::for_day(date, activities)
            })
            .collect()
    }

    pub fn commit_columns(&self, columns: &[Column]) -> Self {
        let mut days = self.days.clone();
        columns.iter().for_each(|column| {
            days.insert(column.id, column.activities.clone());
        });

        Self { days }
    }

    pub fn add_activity(&self, activity: &Activity, column_id: DayKey) -> Self {
        let mut days = self.days.clone();
        days.entry(column_id)
            .or_default()
            .push(activity.placed_copy());

        Self { days }
    }

    pub fn edit_activity(&self, activity_id: &str, replacement: &Activity) -> Self {
        let days = self
            .days
            .iter()
            .map(|(day, activities)| (*day, replace_by_id(activities, activity_id, replacement)))
            .collect();

        Self { days }
    }

    pub fn delete_activity(&self, activity_id: &str) -> Self {
        let days = self
            .days
            .iter()
            .map(|(day, activities)| {
                let kept = activities
                    .iter()
                    .filter(|activity| activity.id != activity_id)
                    .cloned()
                    .collect::<Vec<_>>();
                (*day, kept)
            })
            .collect();

        Self { days }
    }

    pub fn activities_for(&self, day: &DayKey) -> &[Activity] {
        self.days.get(day).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn find_activity(&self, activity_id: &str) -> Option<&Activity> {
        self.days
            .values()
            .flatten()
            .find(|activity| activity.id == activity_id)
    }

    pub fn planned_days(&self) -> usize {
        self.days
            .values()
            .filter(|activities| !activities.is_empty())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    activities: Vec<Activity>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            activities: default_catalog(),
        }
    }
}

impl Catalog {
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get(&self, activity_id: &str) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|activity| activity.id == activity_id)
    }

    pub fn add(&self, draft: ActivityDraft) -> Result<Self> {
        let activity = draft.into_activity()?;
        let activities = self
            .activities
            .iter()
            .cloned()
            .chain(std::iter::once(activity))
            .collect();

        Ok(Self { activities })
    }

    pub fn edit(&self, activity_id: &str, replacement: &Activity) -> Self {
        Self {
            activities: replace_by_id(&self.activities, activity_id, replacement),
        }
    }

    pub fn delete(&self, activity_id: &str) -> Self {
        Self {
            activities: self
                .activities
                .iter()
                .filter(|activity| activity.id != activity_id)
                .cloned()
                .collect(),
        }
    }
}

fn replace_by_id(activities: &[Activity], activity_id: &str, replacement: &Activity) -> Vec<Activity> {
    activities
        .iter()
        .map(|activity| {
            if activity.id == activity_id {
                Activity {
                    id: activity.id.clone(),
                    ..replacement.clone()
                }
            } else {
                activity.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::activity::Category;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn weekend() -> DateRange {
        DateRange::new(date(2024, 6, 1), date(2024, 6, 2)).expect("range")
    }

    fn saturday() -> DayKey {
        DayKey::from_date(date(2024, 6, 1))
    }

    fn sunday() -> DayKey {
        DayKey::from_date(date(2024, 6, 2))
    }

    #[test]
    fn materializes_one_column_per_day() {
        let store = PlanStore::default().add_activity(&default_catalog()[0], saturday());
        let columns = store.materialize_columns(&weekend());

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].id, saturday());
        assert_eq!(columns[0].title, "Saturday\nJun 1");
        assert_eq!(columns[1].title, "Sunday\nJun 2");
        assert_eq!(columns[0].activities.len(), 1);
        assert!(columns[1].activities.is_empty());
        assert_eq!(columns, store.materialize_columns(&weekend()));
    }

    #[test]
    fn adding_twice_mints_distinct_ids() {
        let source = &default_catalog()[2];
        let store = PlanStore::default()
            .add_activity(source, saturday())
            .add_activity(source, sunday());

        let first = &store.activities_for(&saturday())[0];
        let second = &store.activities_for(&sunday())[0];
        assert_ne!(first.id, second.id);
        assert_ne!(first.id, source.id);
        for placed in [first, second] {
            assert_eq!(placed.title, source.title);
            assert_eq!(placed.description, source.description);
            assert_eq!(placed.category, source.category);
            assert_eq!(placed.location, source.location);
        }
    }

    #[test]
    fn commit_overwrites_only_given_days() {
        let store = PlanStore::default()
            .add_activity(&default_catalog()[0], saturday())
            .add_activity(&default_catalog()[1], DayKey::from_date(date(2024, 6, 8)));

        let mut columns = store.materialize_columns(&weekend());
        columns[0].activities.clear();
        let committed = store.commit_columns(&columns);

        assert!(committed.activities_for(&saturday()).is_empty());
        assert_eq!(
            committed
                .activities_for(&DayKey::from_date(date(2024, 6, 8)))
                .len(),
            1
        );
    }

    #[test]
    fn edit_preserves_position_and_id() {
        let store = PlanStore::default()
            .add_activity(&default_catalog()[0], saturday())
            .add_activity(&default_catalog()[1], saturday());
        let target = store.activities_for(&saturday())[0].id.clone();

        let replacement = Activity {
            id: "ignored".to_string(),
            title: "Sunrise Yoga".to_string(),
            category: Category::Wellness,
            ..default_catalog()[0].clone()
        };
        let edited = store.edit_activity(&target, &replacement);

        let activities = edited.activities_for(&saturday());
        assert_eq!(activities[0].id, target);
        assert_eq!(activities[0].title, "Sunrise Yoga");
        assert_eq!(activities[1].title, "Coffee Shop Visit");
    }

    #[test]
    fn delete_removes_from_every_day_but_not_catalog() {
        let catalog = Catalog::default();
        let store = PlanStore::default().add_activity(&catalog.activities()[0], saturday());
        let placed = store.activities_for(&saturday())[0].id.clone();

        let store = store.delete_activity(&placed);
        assert!(store.find_activity(&placed).is_none());
        assert_eq!(catalog.activities().len(), 6);
    }

    #[test]
    fn catalog_edits_are_independent_of_placed_copies() {
        let catalog = Catalog::default();
        let store = PlanStore::default().add_activity(&catalog.activities()[3], sunday());

        let catalog = catalog.delete("act-4");
        assert!(catalog.get("act-4").is_none());
        assert_eq!(store.activities_for(&sunday())[0].title, "Beach Walk");

        let catalog = catalog
            .add(ActivityDraft {
                title: "Kayaking".to_string(),
                description: "Paddle across the bay".to_string(),
                ..ActivityDraft::default()
            })
            .expect("valid draft");
        assert_eq!(catalog.activities().len(), 6);
        assert_eq!(catalog.activities()[5].title, "Kayaking");
    }
}
