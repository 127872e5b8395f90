/// Dashboard configuration loader - parses dashboard.toml
///
/// Separates station metadata, provider timeouts, and refresh cadence from
/// code, making it easy to add a gauge or re-point a provider without
/// recompiling the service.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::model::Provider;
use crate::stations::{Station, WeatherLocation, is_valid_usgs_code};

/// Default location of the configuration file, relative to the working
/// directory (project root when running via `cargo run`).
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The file is not valid TOML for this schema.
    Parse(String),
    /// The file parsed but describes an unusable dashboard.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Configuration structures
// ---------------------------------------------------------------------------

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub weather_provider: WeatherProviderConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(rename = "station", default)]
    pub stations: Vec<Station>,
    #[serde(rename = "weather", default)]
    pub weather_locations: Vec<WeatherLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// Upper bound on points returned per chart series.
    #[serde(default = "default_chart_max_points")]
    pub chart_max_points: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            chart_max_points: default_chart_max_points(),
        }
    }
}

fn default_interval_minutes() -> u64 {
    15
}

fn default_chart_max_points() -> usize {
    200
}

/// Per-provider request timeouts, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_usgs_timeout")]
    pub usgs: u64,
    #[serde(default = "default_hydromet_timeout")]
    pub usbr: u64,
    #[serde(default = "default_hydromet_timeout")]
    pub nwrfc: u64,
    #[serde(default = "default_usgs_timeout")]
    pub nwps: u64,
    #[serde(default = "default_weather_timeout")]
    pub weather: u64,
    #[serde(default = "default_weather_timeout")]
    pub alerts: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            usgs: default_usgs_timeout(),
            usbr: default_hydromet_timeout(),
            nwrfc: default_hydromet_timeout(),
            nwps: default_usgs_timeout(),
            weather: default_weather_timeout(),
            alerts: default_weather_timeout(),
        }
    }
}

fn default_usgs_timeout() -> u64 {
    15
}

fn default_hydromet_timeout() -> u64 {
    12
}

fn default_weather_timeout() -> u64 {
    10
}

impl TimeoutConfig {
    pub fn for_provider(&self, provider: Provider) -> Duration {
        let secs = match provider {
            Provider::Usgs => self.usgs,
            Provider::Usbr => self.usbr,
            Provider::Nwrfc => self.nwrfc,
            Provider::Nwps => self.nwps,
            Provider::Weather => self.weather,
            Provider::Alerts => self.alerts,
        };
        Duration::from_secs(secs)
    }
}

/// Optional CORS proxy for the providers that do not send CORS headers.
/// When `base_url` is unset those providers are requested directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherProviderKind {
    /// Parallel arrays per variable at fixed 3-hour steps (SI units).
    PointForecast,
    /// Separate `current` and `daily` blocks with a WMO condition code.
    OpenMeteo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherProviderConfig {
    #[serde(default = "default_weather_kind")]
    pub kind: WeatherProviderKind,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_weather_model")]
    pub model: String,
}

impl Default for WeatherProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_weather_kind(),
            api_key: None,
            model: default_weather_model(),
        }
    }
}

fn default_weather_kind() -> WeatherProviderKind {
    WeatherProviderKind::OpenMeteo
}

fn default_weather_model() -> String {
    "gfs".to_string()
}

/// Which NWS alerts are shown: the feed for `area`, filtered to events
/// matching any of `event_keywords` in areas matching any of `area_keywords`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_alert_area")]
    pub area: String,
    #[serde(default = "default_event_keywords")]
    pub event_keywords: Vec<String>,
    #[serde(default = "default_area_keywords")]
    pub area_keywords: Vec<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            area: default_alert_area(),
            event_keywords: default_event_keywords(),
            area_keywords: default_area_keywords(),
        }
    }
}

fn default_alert_area() -> String {
    "WA".to_string()
}

fn default_event_keywords() -> Vec<String> {
    ["Flood", "Winter", "Wind", "Heat", "Fire", "Storm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_area_keywords() -> Vec<String> {
    ["Yakima", "Kittitas", "Benton", "Cascades"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads and validates the configuration at `path`.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<DashboardConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    parse_config(&contents)
}

/// Loads `dashboard.toml` from the working directory.
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<DashboardConfig, ConfigError> {
    let config: DashboardConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

impl DashboardConfig {
    /// Checks the invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate station id '{}'", station.id)));
            }
            if !station.has_identifier() {
                return Err(ConfigError::Invalid(format!(
                    "station '{}' has no provider identifiers",
                    station.id
                )));
            }
            if let Some(code) = station.identifier(Provider::Usgs) {
                if !is_valid_usgs_code(code) {
                    return Err(ConfigError::Invalid(format!(
                        "station '{}' has malformed USGS site code '{}'",
                        station.id, code
                    )));
                }
            }
            check_coordinates(&station.id, station.latitude, station.longitude)?;
        }

        let mut seen = HashSet::new();
        for location in &self.weather_locations {
            if !seen.insert(location.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate weather location id '{}'",
                    location.id
                )));
            }
            check_coordinates(&location.id, location.latitude, location.longitude)?;
        }

        if self.refresh.interval_minutes == 0 {
            return Err(ConfigError::Invalid("refresh.interval_minutes must be positive".to_string()));
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_minutes * 60)
    }
}

fn check_coordinates(id: &str, latitude: f64, longitude: f64) -> Result<(), ConfigError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ConfigError::Invalid(format!(
            "'{}' has out-of-range coordinates ({}, {})",
            id, latitude, longitude
        )));
    }
    Ok(())
}
