use crate::config::Config;
use crate::lookup::{holiday_api_key, http_client, run_blocking};
use crate::planner::ranges::DateRange;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

const MAX_RESULTS: &str = "2500";
const DEFAULT_HOLIDAY_NAME: &str = "Holiday";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEvent {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

pub fn calendar_id(country_code: &str) -> String {
    let code = Some(country_code.trim())
        .filter(|code| !code.is_empty())
        .unwrap_or("US")
        .to_uppercase();

    let region = match code.as_str() {
        "US" => "usa",
        "GB" => "great_britain",
        "IN" => "indian",
        "CA" => "canadian",
        "AU" => "australian",
        "NZ" => "new_zealand",
        "IE" => "irish",
        "SG" => "singapore",
        "ZA" => "sa",
        "PH" => "philippines",
        "MY" => "malaysia",
        _ => return format!("en.{}#holiday@group.v.calendar.google.com", code.to_lowercase()),
    };

    format!("en.{region}#holiday@group.v.calendar.google.com")
}

pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(today);
    (start, end)
}

pub fn fetch_holidays(
    config: &Config,
    country_code: &str,
    time_min: NaiveDate,
    time_max: NaiveDate,
) -> Result<Vec<HolidayEvent>> {
    let api_key = holiday_api_key(config).context(
        "Holiday API key is missing. Set `planify config set holidays.api_key <KEY>` or `PLANIFY_HOLIDAY_API_KEY`.",
    )?;
    let endpoint = events_url(config, country_code, time_min, time_max, &api_key)?;
    let timeout_seconds = config.lookup_timeout_seconds;

    debug!(country = country_code, %time_min, %time_max, "fetching holidays");
    run_blocking("holidays", move || {
        fetch_holidays_blocking(endpoint, timeout_seconds)
    })
}

fn fetch_holidays_blocking(endpoint: Url, timeout_seconds: u64) -> Result<Vec<HolidayEvent>> {
    let client = http_client(timeout_seconds)?;
    let response = client
        .get(endpoint)
        .send()
        .context("Holiday API request failed")?;

    let status = response.status();
    let body = response
        .text()
        .context("Failed to read holiday response body")?;

    if !status.is_success() {
        bail!("Holiday API error {}: {}", status, body);
    }

    parse_events(&body)
}

fn events_url(
    config: &Config,
    country_code: &str,
    time_min: NaiveDate,
    time_max: NaiveDate,
    api_key: &str,
) -> Result<Url> {
    let mut url = Url::parse(config.holiday_api_base_url.trim_end_matches('/'))
        .with_context(|| format!("Invalid holiday API base URL: {}", config.holiday_api_base_url))?;

    url.path_segments_mut()
        .map_err(|_| anyhow!("Holiday API base URL cannot carry a path"))?
        .pop_if_empty()
        .push("calendars")
        .push(&calendar_id(country_code))
        .push("events");

    url.query_pairs_mut()
        .append_pair("key", api_key)
        .append_pair("singleEvents", "true")
        .append_pair("orderBy", "startTime")
        .append_pair("timeMin", &utc_midnight(time_min))
        .append_pair("timeMax", &utc_midnight(time_max))
        .append_pair("maxResults", MAX_RESULTS);

    Ok(url)
}

fn utc_midnight(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct CalendarEvent {
    #[serde(default)]
    id: String,
    summary: Option<String>,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date: Option<String>,
    date_time: Option<String>,
}

impl EventTime {
    fn day(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .or_else(|| {
                self.date_time
                    .as_deref()
                    .and_then(|value| value.split('T').next())
            })
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }
}

fn parse_events(body: &str) -> Result<Vec<HolidayEvent>> {
    let parsed: EventsResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse holiday response: {body}"))?;

    Ok(parsed
        .items
        .into_iter()
        .filter_map(|event| {
            let Some(date) = event.start.day() else {
                debug!(id = %event.id, "skipping holiday without a start date");
                return None;
            };

            Some(HolidayEvent {
                name: event
                    .summary
                    .filter(|summary| !summary.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_HOLIDAY_NAME.to_string()),
                id: event.id,
                date,
                end_date: event.end.day(),
            })
        })
        .collect())
}

pub fn annotate(holidays: &[HolidayEvent], range: &DateRange) -> BTreeMap<NaiveDate, Vec<String>> {
    holidays
        .iter()
        .filter(|holiday| range.contains(holiday.date))
        .fold(BTreeMap::new(), |mut by_day, holiday| {
            by_day
                .entry(holiday.date)
                .or_insert_with(Vec::new)
                .push(holiday.name.clone());
            by_day
        })
}
