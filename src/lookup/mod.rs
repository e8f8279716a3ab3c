pub mod holidays;
pub mod places;

use crate::config::{Config, MIN_LOOKUP_TIMEOUT_SECONDS};
use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

pub const PLACES_API_KEY_ENV: &str = "PLANIFY_PLACES_API_KEY";
pub const HOLIDAY_API_KEY_ENV: &str = "PLANIFY_HOLIDAY_API_KEY";

pub fn places_api_key(config: &Config) -> Option<String> {
    resolve_api_key(PLACES_API_KEY_ENV, config.places_api_key.as_deref())
}

pub fn holiday_api_key(config: &Config) -> Option<String> {
    resolve_api_key(HOLIDAY_API_KEY_ENV, config.holiday_api_key.as_deref())
}

fn resolve_api_key(env_name: &str, configured: Option<&str>) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        })
}

fn http_client(timeout_seconds: u64) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(Duration::from_secs(
            timeout_seconds.max(MIN_LOOKUP_TIMEOUT_SECONDS),
        ))
        .default_headers(headers)
        .build()
        .context("Failed to create lookup HTTP client")
}

fn run_blocking<T, F>(label: &'static str, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    std::thread::spawn(job)
        .join()
        .map_err(|_| anyhow!("{label} worker thread panicked"))?
}
