/// Sample, SeriesSet, StationReading, WeatherReading, Alert, FetchError
/// core data structures and error handling
///
/// Core data types for the Yakima basin dashboard service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O — only types and the small amount of logic needed to
/// keep their invariants (finite sample values, sortable series).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for water temperature, in degrees Celsius.
pub const PARAM_WATER_TEMP: &str = "00010";

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_STAGE: &str = "00065";

/// Sentinel the USGS and USBR feeds use for "no value recorded".
pub const MISSING_VALUE_SENTINEL: f64 = -999_999.0;

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Upstream data providers the dashboard polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// USGS NWIS instantaneous values (primary gauge source).
    Usgs,
    /// USBR Pacific Northwest hydromet (secondary agency source).
    Usbr,
    /// NOAA Northwest River Forecast Center text plots (supplemental temperature).
    Nwrfc,
    /// NWS National Water Prediction Service (forecast flow).
    Nwps,
    /// Point-forecast weather provider.
    Weather,
    /// NWS active hazard alerts.
    Alerts,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Usgs => "USGS",
            Provider::Usbr => "USBR",
            Provider::Nwrfc => "NWRFC",
            Provider::Nwps => "NWPS",
            Provider::Weather => "Weather",
            Provider::Alerts => "NWS Alerts",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// One timestamped measurement. `value` is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    /// Builds a sample, rejecting NaN, infinities and the missing-value sentinel.
    pub fn new(time: DateTime<Utc>, value: f64) -> Option<Sample> {
        if !value.is_finite() || (value - MISSING_VALUE_SENTINEL).abs() < 0.1 {
            return None;
        }
        Some(Sample { time, value })
    }
}

/// Sorts a series in place by timestamp (stable, so equal times keep source order).
pub fn sort_by_time(samples: &mut [Sample]) {
    samples.sort_by_key(|s| s.time);
}

/// Every series the dashboard tracks for a station. Lists are in source
/// order; call [`SeriesSet::sorted`] before charting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesSet {
    /// Discharge, cubic feet per second.
    pub discharge: Vec<Sample>,
    /// Water temperature, degrees Fahrenheit.
    pub water_temp: Vec<Sample>,
    /// Gage height, feet.
    pub gage_height: Vec<Sample>,
    /// Forecast discharge, cubic feet per second.
    pub forecast: Vec<Sample>,
}

impl SeriesSet {
    pub fn is_empty(&self) -> bool {
        self.discharge.is_empty()
            && self.water_temp.is_empty()
            && self.gage_height.is_empty()
            && self.forecast.is_empty()
    }

    /// Returns a copy with every series ordered by time.
    pub fn sorted(&self) -> SeriesSet {
        let mut out = self.clone();
        sort_by_time(&mut out.discharge);
        sort_by_time(&mut out.water_temp);
        sort_by_time(&mut out.gage_height);
        sort_by_time(&mut out.forecast);
        out
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// The snapshot produced for one station by one refresh cycle.
///
/// A new reading always replaces the previous one wholesale, even when the
/// new one is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationReading {
    pub series: SeriesSet,
    /// Provider whose discharge series was accepted, if any.
    pub source: Option<Provider>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StationReading {
    pub fn has_discharge(&self) -> bool {
        !self.series.discharge.is_empty()
    }
}

/// Coarse weather description shown on the weather cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Mix,
    Snow,
    Thunderstorm,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::PartlyCloudy => "Partly Cloudy",
            Condition::Overcast => "Overcast",
            Condition::Fog => "Fog",
            Condition::Drizzle => "Drizzle",
            Condition::Rain => "Rain",
            Condition::Mix => "Wintry Mix",
            Condition::Snow => "Snow",
            Condition::Thunderstorm => "Thunderstorms",
        }
    }
}

/// Conditions "now" for a weather location, all in US customary units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub observed_at: DateTime<Utc>,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub wind_mph: f64,
    pub gust_mph: Option<f64>,
    pub humidity_pct: Option<f64>,
    /// Precipitation over the provider's most recent step, inches.
    pub precip_in: f64,
    pub condition: Condition,
}

/// One calendar day of the multi-day outlook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub label: String,
    pub high_f: f64,
    pub low_f: f64,
    pub precip_in: f64,
}

/// The snapshot produced for one weather location by one refresh cycle.
/// `current == None` means the location had no data this cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherReading {
    pub current: Option<CurrentConditions>,
    pub daily: Vec<DailySummary>,
}

impl WeatherReading {
    pub fn has_data(&self) -> bool {
        self.current.is_some() || !self.daily.is_empty()
    }
}

/// An active NWS hazard alert relevant to the basin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub event: String,
    pub headline: String,
}

/// 24-hour direction of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// Three-level dashboard health indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Every station produced discharge.
    AllLoaded,
    /// Some, but not all, stations produced discharge.
    Partial,
    /// No station produced discharge.
    NoneLoaded,
}

impl HealthStatus {
    /// Derives the indicator from the count of stations with discharge.
    pub fn from_counts(loaded: usize, total: usize) -> HealthStatus {
        if total > 0 && loaded >= total {
            HealthStatus::AllLoaded
        } else if loaded > 0 {
            HealthStatus::Partial
        } else {
            HealthStatus::NoneLoaded
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching from or parsing an upstream provider.
/// Every variant carries the station or location identifier involved.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Non-2xx HTTP response.
    HttpError { provider: Provider, id: String, status: u16 },
    /// The per-request timeout elapsed and the request was aborted.
    Timeout { provider: Provider, id: String },
    /// Connection, TLS, or body-read failure.
    Transport { provider: Provider, id: String, message: String },
    /// The response body could not be interpreted.
    ParseError { provider: Provider, id: String, message: String },
}

impl FetchError {
    pub fn provider(&self) -> Provider {
        match self {
            FetchError::HttpError { provider, .. }
            | FetchError::Timeout { provider, .. }
            | FetchError::Transport { provider, .. }
            | FetchError::ParseError { provider, .. } => *provider,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            FetchError::HttpError { id, .. }
            | FetchError::Timeout { id, .. }
            | FetchError::Transport { id, .. }
            | FetchError::ParseError { id, .. } => id,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::HttpError { provider, id, status } => {
                write!(f, "{} HTTP error for {}: {}", provider, id, status)
            }
            FetchError::Timeout { provider, id } => {
                write!(f, "{} request for {} timed out", provider, id)
            }
            FetchError::Transport { provider, id, message } => {
                write!(f, "{} transport error for {}: {}", provider, id, message)
            }
            FetchError::ParseError { provider, id, message } => {
                write!(f, "{} parse error for {}: {}", provider, id, message)
            }
        }
    }
}

impl std::error::Error for FetchError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
