/// NOAA Northwest River Forecast Center text-plot client.
///
/// Supplies water temperature (already °F) for stations whose primary or
/// fallback source did not report one. The endpoint returns an HTML page
/// whose data lives in adjacent `<td>` cells: timestamp, then value.
///
/// Endpoint: https://www.nwrfc.noaa.gov/station/flowplot/textPlot.cgi
///
/// Like USBR, no CORS headers; routed via `{proxy}/api/nwrfc` when a proxy
/// is configured.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use crate::model::{FetchError, Provider, Sample};

use super::{http, parse_local_datetime};

pub const NWRFC_BASE_URL: &str = "https://www.nwrfc.noaa.gov/station/flowplot/textPlot.cgi";

/// Proxy route served by the dashboard endpoint.
pub const NWRFC_PROXY_PATH: &str = "/api/nwrfc";

/// Physical element code for water temperature.
pub const PE_WATER_TEMP: &str = "TW";

/// Samples older than this are dropped.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 168;

pub fn build_url(station: &str, element: &str, proxy_base: Option<&str>) -> String {
    let base = http::route_url(proxy_base, NWRFC_PROXY_PATH, NWRFC_BASE_URL);
    format!("{}?id={}&pe={}", base, urlencoding::encode(station), element)
}

pub fn fetch_water_temperature(
    client: &reqwest::blocking::Client,
    station: &str,
    proxy_base: Option<&str>,
    timeout: Duration,
) -> Result<Vec<Sample>, FetchError> {
    let url = build_url(station, PE_WATER_TEMP, proxy_base);
    let body = http::get_text(client, &url, timeout, Provider::Nwrfc, station)?;
    Ok(parse_table_samples_at(
        &body,
        ChronoDuration::hours(DEFAULT_LOOKBACK_HOURS),
        Utc::now(),
    ))
}

fn cell_pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)<td[^>]*>\s*(\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}(?::\d{2})?)\s*</td>\s*<td[^>]*>\s*(-?\d+(?:\.\d+)?)\s*</td>",
        )
        .expect("static NWRFC cell pattern is valid")
    })
}

/// Extracts `(timestamp, value)` cell pairs from an NWRFC text plot,
/// keeping those no older than `lookback` before `now`. Values are used as
/// given. No matches yields an empty list.
pub fn parse_table_samples_at(
    html: &str,
    lookback: ChronoDuration,
    now: DateTime<Utc>,
) -> Vec<Sample> {
    let cutoff = now - lookback;
    cell_pair_pattern()
        .captures_iter(html)
        .filter_map(|caps| {
            let time = parse_local_datetime(caps.get(1)?.as_str())?;
            let value: f64 = caps.get(2)?.as_str().parse().ok()?;
            Sample::new(time, value)
        })
        .filter(|s| s.time >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::fixture_nwrfc_umtanum_html;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // 2026-02-18 20:00 PST
        Utc.with_ymd_and_hms(2026, 2, 19, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_build_url_includes_station_and_element() {
        let url = build_url("UMTW1", PE_WATER_TEMP, None);
        assert_eq!(
            url,
            "https://www.nwrfc.noaa.gov/station/flowplot/textPlot.cgi?id=UMTW1&pe=TW"
        );
        let proxied = build_url("UMTW1", PE_WATER_TEMP, Some("http://localhost:8080"));
        assert_eq!(proxied, "http://localhost:8080/api/nwrfc?id=UMTW1&pe=TW");
    }

    #[test]
    fn test_parse_keeps_recent_pairs_without_conversion() {
        let samples =
            parse_table_samples_at(fixture_nwrfc_umtanum_html(), ChronoDuration::hours(168), now());
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        // Feb 8 is outside the 7-day window; "Missing" row never matches
        assert_eq!(values, vec![39.2, 41.6, 40.3]);
    }

    #[test]
    fn test_parse_short_lookback_drops_older_rows() {
        let samples =
            parse_table_samples_at(fixture_nwrfc_umtanum_html(), ChronoDuration::hours(12), now());
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        // cutoff is 08:00 PST; 06:00 is dropped
        assert_eq!(values, vec![41.6, 40.3]);
    }

    #[test]
    fn test_parse_no_matches_is_empty() {
        let samples = parse_table_samples_at(
            "<html><body>Station not found</body></html>",
            ChronoDuration::hours(168),
            now(),
        );
        assert!(samples.is_empty());
    }
}
