use anyhow::{Context, Result, anyhow, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".planify";
const CONFIG_FILE: &str = "config.json";
pub const MIN_LOOKUP_TIMEOUT_SECONDS: u64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
    pub api_port: u16,
    pub country_code: String,
    pub places_api_key: Option<String>,
    pub places_api_base_url: String,
    pub places_radius_meters: u32,
    pub places_limit: u32,
    pub holiday_api_key: Option<String>,
    pub holiday_api_base_url: String,
    pub lookup_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        let root = default_root_dir();

        Self {
            db_path: root.join("db").join("planner.db"),
            api_port: 7891,
            country_code: "US".to_string(),
            places_api_key: None,
            places_api_base_url: "https://api.olamaps.io/places/v1".to_string(),
            places_radius_meters: 10_000,
            places_limit: 10,
            holiday_api_key: None,
            holiday_api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            lookup_timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn root_dir() -> Result<PathBuf> {
        Ok(default_root_dir())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(default_root_dir().join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.lookup_timeout_seconds = config.lookup_timeout_seconds.max(MIN_LOOKUP_TIMEOUT_SECONDS);

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(&config_path)?;

        Ok(())
    }

    pub fn ensure_bootstrap_files(&self) -> Result<()> {
        let root = Self::root_dir()?;
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create root directory: {}", root.display()))?;

        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "db_path" => {
                self.db_path = expand_home(value);
            }
            "api_port" => {
                self.api_port = value
                    .parse::<u16>()
                    .map_err(|_| anyhow!("api_port must be a number"))?;
            }
            "country_code" => {
                self.country_code = parse_country_code(value)?;
            }
            "places_api_key" => {
                self.places_api_key = (!value.trim().is_empty()).then_some(value.to_string());
            }
            "places_api_base_url" => {
                self.places_api_base_url = value.trim().trim_end_matches('/').to_string();
            }
            "places_radius_meters" => {
                self.places_radius_meters = value
                    .parse::<u32>()
                    .map_err(|_| anyhow!("places_radius_meters must be a number"))?;
            }
            "places_limit" => {
                self.places_limit = value
                    .parse::<u32>()
                    .map_err(|_| anyhow!("places_limit must be a number"))?
                    .max(1);
            }
            "holiday_api_key" => {
                self.holiday_api_key = (!value.trim().is_empty()).then_some(value.to_string());
            }
            "holiday_api_base_url" => {
                self.holiday_api_base_url = value.trim().trim_end_matches('/').to_string();
            }
            "lookup_timeout_seconds" => {
                self.lookup_timeout_seconds = value
                    .parse::<u64>()
                    .map_err(|_| anyhow!("lookup_timeout_seconds must be a number"))?
                    .max(MIN_LOOKUP_TIMEOUT_SECONDS);
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: db_path|db.path, api_port|api.port, country_code|holidays.country, places_api_key|places.api_key, places_api_base_url|places.base_url, places_radius_meters|places.radius, places_limit|places.limit, holiday_api_key|holidays.api_key, holiday_api_base_url|holidays.base_url, lookup_timeout_seconds|lookup.timeout_seconds"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "db_path" => Some(self.db_path.display().to_string()),
            "api_port" => Some(self.api_port.to_string()),
            "country_code" => Some(self.country_code.clone()),
            "places_api_key" => Some(mask_secret(self.places_api_key.as_deref())),
            "places_api_base_url" => Some(self.places_api_base_url.clone()),
            "places_radius_meters" => Some(self.places_radius_meters.to_string()),
            "places_limit" => Some(self.places_limit.to_string()),
            "holiday_api_key" => Some(mask_secret(self.holiday_api_key.as_deref())),
            "holiday_api_base_url" => Some(self.holiday_api_base_url.clone()),
            "lookup_timeout_seconds" => Some(self.lookup_timeout_seconds.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "db_path" | "db.path" => "db_path",
        "api_port" | "api.port" => "api_port",
        "country_code" | "holidays.country" => "country_code",
        "places_api_key" | "places.api_key" => "places_api_key",
        "places_api_base_url" | "places.base_url" => "places_api_base_url",
        "places_radius_meters" | "places.radius" => "places_radius_meters",
        "places_limit" | "places.limit" => "places_limit",
        "holiday_api_key" | "holidays.api_key" => "holiday_api_key",
        "holiday_api_base_url" | "holidays.base_url" => "holiday_api_base_url",
        "lookup_timeout_seconds" | "lookup.timeout_seconds" => "lookup_timeout_seconds",
        _ => key,
    }
}

pub fn is_secret_key(key: &str) -> bool {
    matches!(
        normalize_config_key(key),
        "places_api_key" | "holiday_api_key"
    )
}

fn mask_secret(value: Option<&str>) -> String {
    value
        .map(|_| "***set***".to_string())
        .unwrap_or_else(|| "not_set".to_string())
}

pub fn parse_country_code(value: &str) -> Result<String> {
    let code = value.trim().to_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("Invalid country code: {value}. Example: US");
    }

    Ok(code)
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}
