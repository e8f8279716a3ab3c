use crate::config::Config;
use crate::lookup::{http_client, places_api_key, run_blocking};
use crate::planner::activity::{Activity, Category, new_catalog_id};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

const ALL_TYPES: &str = "all";
const DEFAULT_PLACE_DURATION: &str = "1 hour";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: String,
    pub primary_name: String,
    pub secondary_name: String,
    pub types: Vec<String>,
    pub distance_meters: Option<f64>,
}

impl PlaceCandidate {
    pub fn to_activity(&self) -> Activity {
        let name = Some(self.primary_name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or("Visit");

        Activity {
            id: new_catalog_id(),
            title: format!("Visit {name}"),
            description: self.secondary_name.clone(),
            duration: DEFAULT_PLACE_DURATION.to_string(),
            category: category_for_types(&self.types),
            location: name.to_string(),
        }
    }
}

pub fn category_for_types(types: &[String]) -> Category {
    types
        .iter()
        .find_map(|place_type| match place_type.as_str() {
            "restaurant" | "cafe" => Some(Category::Food),
            "gym" => Some(Category::Wellness),
            "museum" => Some(Category::Culture),
            "park" => Some(Category::Outdoors),
            "shopping_mall" => Some(Category::Shopping),
            "movie_theater" => Some(Category::Entertainment),
            _ => None,
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    structured_formatting: StructuredFormatting,
    #[serde(default)]
    types: Vec<String>,
    distance_meters: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct StructuredFormatting {
    #[serde(default)]
    main_text: String,
    #[serde(default)]
    secondary_text: String,
}

impl From<Prediction> for PlaceCandidate {
    fn from(prediction: Prediction) -> Self {
        Self {
            id: prediction.place_id,
            primary_name: prediction.structured_formatting.main_text,
            secondary_name: prediction.structured_formatting.secondary_text,
            types: prediction.types,
            distance_meters: prediction.distance_meters,
        }
    }
}

pub fn search_nearby(
    config: &Config,
    lat: f64,
    lng: f64,
    place_type: &str,
) -> Result<Vec<PlaceCandidate>> {
    let api_key = places_api_key(config).context(
        "Places API key is missing. Set `planify config set places.api_key <KEY>` or `PLANIFY_PLACES_API_KEY`.",
    )?;
    let endpoint = nearby_search_url(config, lat, lng, place_type, &api_key)?;
    let timeout_seconds = config.lookup_timeout_seconds;

    debug!(lat, lng, place_type, "searching nearby places");
    run_blocking("places", move || {
        search_nearby_blocking(endpoint, timeout_seconds)
    })
}

fn search_nearby_blocking(endpoint: Url, timeout_seconds: u64) -> Result<Vec<PlaceCandidate>> {
    let client = http_client(timeout_seconds)?;
    let response = client
        .get(endpoint)
        .send()
        .context("Places API request failed")?;

    let status = response.status();
    let body = response
        .text()
        .context("Failed to read places response body")?;

    if !status.is_success() {
        bail!("Places API error {}: {}", status, body);
    }

    parse_predictions(&body)
}

fn nearby_search_url(
    config: &Config,
    lat: f64,
    lng: f64,
    place_type: &str,
    api_key: &str,
) -> Result<Url> {
    let base = format!(
        "{}/nearbysearch",
        config.places_api_base_url.trim_end_matches('/')
    );
    let mut url = Url::parse(&base)
        .with_context(|| format!("Invalid places API base URL: {}", config.places_api_base_url))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("location", &format!("{lat},{lng}"))
            .append_pair("radius", &config.places_radius_meters.to_string())
            .append_pair("withCentroid", "false")
            .append_pair("rankBy", "popular")
            .append_pair("limit", &config.places_limit.to_string());

        let place_type = place_type.trim();
        if !place_type.is_empty() && place_type != ALL_TYPES {
            query.append_pair("types", place_type);
        }
        query.append_pair("api_key", api_key);
    }

    Ok(url)
}

fn parse_predictions(body: &str) -> Result<Vec<PlaceCandidate>> {
    let parsed: NearbySearchResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse places response: {body}"))?;

    Ok(parsed
        .predictions
        .into_iter()
        .map(PlaceCandidate::from)
        .collect())
}
