/// yakmon_service: Yakima basin river and weather dashboard service.
///
/// # Module structure
///
/// ```text
/// yakmon_service
/// ├── model       — shared data types (Sample, SeriesSet, StationReading, FetchError, …)
/// ├── convert     — unit conversions and wind chill
/// ├── logging     — structured logging with provider tags and failure classification
/// ├── config      — dashboard.toml loader (stations, weather locations, timeouts, proxy)
/// ├── stations    — station and weather-location definitions
/// ├── ingest
/// │   ├── usgs    — USGS NWIS IV JSON
/// │   ├── usbr    — USBR hydromet CSV
/// │   ├── nwrfc   — NWRFC HTML text plots
/// │   ├── nwps    — NWPS stageflow forecast JSON
/// │   ├── weather — point-forecast and Open-Meteo JSON
/// │   ├── alerts  — NWS active alerts
/// │   ├── http    — shared client and error mapping
/// │   ├── sources — live HttpSources
/// │   └── fixtures (test only) — representative API response payloads
/// ├── analysis
/// │   ├── series     — latest, trend, downsampling, nearest-time alignment
/// │   └── conditions — weather condition heuristic and WMO codes
/// ├── reconcile
/// │   ├── station — provider fallback chain, temperature supplement, forecast overlay
/// │   └── weather — forecast and alert reconciliation
/// ├── monitor     — snapshot store, reading sink, health aggregation
/// ├── daemon      — refresh cycle, in-flight guard, auto-refresh loop
/// └── endpoint    — HTTP API and CORS proxy
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod convert;
pub mod daemon;
pub mod endpoint;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod reconcile;
pub mod stations;
