/// USBR Pacific Northwest Hydromet instantaneous data client.
///
/// Fallback source for discharge (`q`, cfs) and water temperature (`tw`, °C)
/// when a station has no USGS gauge or USGS returned nothing.
///
/// Endpoint: https://www.usbr.gov/pn-bin/instant.pl
///
/// The service has no CORS headers, so when a proxy is configured requests
/// go to `{proxy}/api/usbr` instead of the upstream URL.

use std::time::Duration;

use crate::convert::c_to_f;
use crate::model::{FetchError, Provider, Sample, SeriesSet};

use super::{http, parse_local_datetime};

pub const USBR_BASE_URL: &str = "https://www.usbr.gov/pn-bin/instant.pl";

/// Proxy route served by the dashboard endpoint.
pub const USBR_PROXY_PATH: &str = "/api/usbr";

/// Hydromet parameter code for discharge.
pub const PARAM_Q: &str = "q";
/// Hydromet parameter code for water temperature (°C).
pub const PARAM_TW: &str = "tw";

/// Value USBR writes into a cell when the instrument reported nothing.
pub const USBR_MISSING_VALUE: f64 = 998877.0;

/// Hours of history requested.
pub const LOOKBACK_HOURS: u32 = 168;

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the query string for an instant.pl request:
/// `list=easw q,easw tw&back=168&format=csv` (URL-encoded).
pub fn build_query(code: &str, params: &[&str], back_hours: u32) -> String {
    let list = params
        .iter()
        .map(|p| format!("{} {}", code, p))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "list={}&back={}&format=csv",
        urlencoding::encode(&list),
        back_hours
    )
}

/// Full request URL, direct or via the proxy.
pub fn build_url(code: &str, proxy_base: Option<&str>) -> String {
    let base = http::route_url(proxy_base, USBR_PROXY_PATH, USBR_BASE_URL);
    format!("{}?{}", base, build_query(code, &[PARAM_Q, PARAM_TW], LOOKBACK_HOURS))
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

pub fn fetch_station_series(
    client: &reqwest::blocking::Client,
    code: &str,
    proxy_base: Option<&str>,
    timeout: Duration,
) -> Result<SeriesSet, FetchError> {
    let url = build_url(code, proxy_base);
    let body = http::get_text(client, &url, timeout, Provider::Usbr, code)?;
    Ok(parse_usbr_csv(&body, code))
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses instant.pl CSV output for station `code`.
///
/// The header is the first line starting with `DateTime` (any case); lines
/// before it are preamble. Columns are located by `{code}_{param}`, exact or
/// as a suffix, ignoring case. Rows with an unparsable timestamp are
/// skipped; unparsable cells and the `998877` missing marker are skipped
/// individually. Negative discharge is rejected. Temperature is converted to
/// °F. Timestamps are Pacific local.
///
/// Never fails: anything malformed yields empty series.
pub fn parse_usbr_csv(text: &str, code: &str) -> SeriesSet {
    let mut series = SeriesSet::default();
    let mut lines = text.lines();

    let Some(header) = lines
        .by_ref()
        .find(|line| line.trim_start().to_ascii_lowercase().starts_with("datetime"))
    else {
        return series;
    };

    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    let q_idx = find_column(&columns, code, PARAM_Q);
    let tw_idx = find_column(&columns, code, PARAM_TW);

    for line in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let Some(time) = fields.first().and_then(|f| parse_local_datetime(f)) else {
            continue;
        };

        if let Some(q) = cell(&fields, q_idx) {
            if q >= 0.0 {
                series.discharge.extend(Sample::new(time, q));
            }
        }
        if let Some(tw) = cell(&fields, tw_idx) {
            series.water_temp.extend(Sample::new(time, c_to_f(tw)));
        }
    }

    series
}

fn find_column(columns: &[String], code: &str, param: &str) -> Option<usize> {
    let target = format!("{}_{}", code, param).to_ascii_lowercase();
    columns
        .iter()
        .position(|c| *c == target)
        .or_else(|| columns.iter().position(|c| c.ends_with(&target)))
}

fn cell(fields: &[&str], idx: Option<usize>) -> Option<f64> {
    let value: f64 = fields.get(idx?)?.parse().ok()?;
    (value != USBR_MISSING_VALUE).then_some(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
