/// Data ingestion for the Yakima basin dashboard.
///
/// Submodules, one per upstream provider:
/// - `usgs`    — USGS NWIS IV JSON (primary discharge / temperature / stage)
/// - `usbr`    — USBR hydromet CSV (fallback discharge / temperature)
/// - `nwrfc`   — NWRFC HTML text plots (supplemental water temperature)
/// - `nwps`    — NWS NWPS stageflow JSON (forecast flow)
/// - `weather` — point-forecast and Open-Meteo weather JSON
/// - `alerts`  — NWS active hazard alerts
/// - `http`    — shared blocking client, per-request timeouts, error mapping
/// - `sources` — the live `HttpSources` implementation of the traits below
/// - `fixtures` (test only) — representative response bodies

pub mod alerts;
pub mod http;
pub mod nwps;
pub mod nwrfc;
pub mod sources;
pub mod usbr;
pub mod usgs;
pub mod weather;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::model::{Alert, FetchError, Sample, SeriesSet, WeatherReading};
use crate::stations::WeatherLocation;

/// Timezone for provider timestamps that carry no offset (USBR, NWRFC,
/// Open-Meteo local times) and for grouping forecasts into calendar days.
pub const REFERENCE_TZ: Tz = chrono_tz::America::Los_Angeles;

/// Hydrology fetches needed to reconcile one station. Each call is one
/// outbound request bounded by that provider's timeout.
pub trait StationSources: Send + Sync {
    /// Primary gauge series by USGS site number.
    fn primary(&self, site: &str) -> Result<SeriesSet, FetchError>;
    /// Agency hydromet series by USBR station code.
    fn secondary(&self, code: &str) -> Result<SeriesSet, FetchError>;
    /// Water temperature (°F) by NWRFC station id.
    fn supplemental_temperature(&self, code: &str) -> Result<Vec<Sample>, FetchError>;
    /// Forecast discharge (cfs) by NWPS gauge id.
    fn forecast_flow(&self, lid: &str) -> Result<Vec<Sample>, FetchError>;
}

/// Weather and hazard fetches.
pub trait WeatherSources: Send + Sync {
    fn forecast(&self, location: &WeatherLocation) -> Result<WeatherReading, FetchError>;
    fn alerts(&self) -> Result<Vec<Alert>, FetchError>;
}

/// Parses a timezone-less timestamp such as `2026-02-18 17:30` as
/// `REFERENCE_TZ` local time. Returns `None` for unparsable text and for
/// local times skipped by a DST transition.
pub fn parse_local_datetime(text: &str) -> Option<DateTime<Utc>> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %H:%M:%S",
    ];
    let text = text.trim();
    let naive = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())?;
    REFERENCE_TZ
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
