use crate::planner::day_key::DayKey;
use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Wellness,
    Food,
    Culture,
    #[default]
    Outdoors,
    Shopping,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Wellness,
        Category::Food,
        Category::Culture,
        Category::Outdoors,
        Category::Shopping,
        Category::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Wellness => "Wellness",
            Category::Food => "Food",
            Category::Culture => "Culture",
            Category::Outdoors => "Outdoors",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "wellness" => Category::Wellness,
            "food" => Category::Food,
            "culture" => Category::Culture,
            "shopping" => Category::Shopping,
            "entertainment" => Category::Entertainment,
            _ => Category::Outdoors,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub location: String,
}

impl Activity {
    pub fn placed_copy(&self) -> Self {
        Self {
            id: mint_placement_id(&self.id),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityDraft {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub category: Category,
    pub location: String,
}

impl ActivityDraft {
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            title: activity.title.clone(),
            description: activity.description.clone(),
            duration: activity.duration.clone(),
            category: activity.category,
            location: activity.location.clone(),
        }
    }

    pub fn into_activity(self) -> Result<Activity> {
        self.replacing(&new_catalog_id())
    }

    pub fn replacing(self, activity_id: &str) -> Result<Activity> {
        if self.title.trim().is_empty() {
            bail!("Activity title is required");
        }
        if self.description.trim().is_empty() {
            bail!("Activity description is required");
        }

        Ok(Activity {
            id: activity_id.to_string(),
            title: self.title,
            description: self.description,
            duration: self.duration,
            category: self.category,
            location: self.location,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: DayKey,
    pub title: String,
    pub activities: Vec<Activity>,
}

impl Column {
    pub fn for_day(date: NaiveDate, activities: Vec<Activity>) -> Self {
        Self {
            id: DayKey::from_date(date),
            title: column_title(date),
            activities,
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        self.id.to_string() == id
    }

    pub fn position(&self, activity_id: &str) -> Option<usize> {
        self.activities
            .iter()
            .position(|activity| activity.id == activity_id)
    }

    pub fn contains(&self, activity_id: &str) -> bool {
        self.position(activity_id).is_some()
    }
}

pub fn column_title(date: NaiveDate) -> String {
    date.format("%A\n%b %-d").to_string()
}

pub fn mint_placement_id(source_id: &str) -> String {
    format!(
        "{source_id}-{}-{}",
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

pub fn new_catalog_id() -> String {
    format!("act-{}-{}", Utc::now().timestamp_millis(), random_suffix())
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..ID_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect()
}

pub fn default_catalog() -> Vec<Activity> {
    [
        (
            "act-1",
            "Morning Yoga",
            "Start your day with relaxing yoga session in the park",
            "1 hour",
            Category::Wellness,
            "Park",
        ),
        (
            "act-2",
            "Coffee Shop Visit",
            "Enjoy a freshly brewed coffee and pastry at local cafe",
            "45 minutes",
            Category::Food,
            "Cafe",
        ),
        (
            "act-3",
            "Museum Tour",
            "Explore the local art museum and learn about history",
            "2 hours",
            Category::Culture,
            "Museum",
        ),
        (
            "act-4",
            "Beach Walk",
            "Take a peaceful walk along the beach during sunset",
            "1.5 hours",
            Category::Outdoors,
            "Beach",
        ),
        (
            "act-5",
            "Shopping",
            "Browse through local markets and shops",
            "2 hours",
            Category::Shopping,
            "Mall",
        ),
        (
            "act-6",
            "Movie Night",
            "Watch the latest blockbuster at the cinema",
            "2.5 hours",
            Category::Entertainment,
            "Cinema",
        ),
    ]
    .into_iter()
    .map(
        |(id, title, description, duration, category, location)| Activity {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
            category,
            location: location.to_string(),
        },
    )
    .collect()
}
