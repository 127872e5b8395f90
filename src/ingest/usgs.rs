/// USGS NWIS Instantaneous Values (IV) API client.
///
/// Handles URL construction, fetching, and JSON response parsing for the
/// USGS Water Services IV endpoint:
///   https://waterservices.usgs.gov/nwis/iv/
///
/// The IV service returns WaterML rendered as JSON. See `fixtures.rs` for
/// annotated examples of the response structure. This is the primary source
/// for discharge, water temperature and gage height.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::convert::c_to_f;
use crate::logging::{self, DataSource};
use crate::model::{
    FetchError, MISSING_VALUE_SENTINEL, PARAM_DISCHARGE, PARAM_STAGE, PARAM_WATER_TEMP, Provider,
    Sample, SeriesSet,
};

use super::http;

// ---------------------------------------------------------------------------
// Serde structures for WaterML JSON deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IvResponse {
    value: ValueWrapper,
}

#[derive(Deserialize)]
struct ValueWrapper {
    #[serde(rename = "timeSeries", default)]
    time_series: Vec<TimeSeries>,
}

#[derive(Deserialize)]
struct TimeSeries {
    variable: Variable,
    #[serde(default)]
    values: Vec<Values>,
}

#[derive(Deserialize)]
struct Variable {
    #[serde(rename = "variableCode", default)]
    variable_code: Vec<VariableCode>,
    #[serde(rename = "noDataValue")]
    no_data_value: Option<f64>,
}

#[derive(Deserialize)]
struct VariableCode {
    value: String,
}

#[derive(Deserialize)]
struct Values {
    #[serde(default)]
    value: Vec<ValueEntry>,
}

#[derive(Deserialize)]
struct ValueEntry {
    value: serde_json::Value, // USGS returns as string!
    #[serde(rename = "dateTime")]
    date_time: String,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

const IV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// Lookback period requested for dashboard charts.
pub const DEFAULT_PERIOD: &str = "P7D";

/// Builds a USGS IV API URL for the given site codes, parameter codes,
/// and ISO 8601 period (e.g. `"PT3H"` for the past three hours, `"P7D"`
/// for the past week).
///
/// The returned URL always requests JSON format and filters to active
/// sites only.
///
/// # Example
/// ```
/// use yakmon_service::ingest::usgs::build_iv_url;
/// use yakmon_service::stations::{PARAM_DISCHARGE, PARAM_WATER_TEMP};
///
/// let url = build_iv_url(&["12484500"], &[PARAM_DISCHARGE, PARAM_WATER_TEMP], "P7D");
/// assert!(url.contains("sites=12484500"));
/// ```
pub fn build_iv_url(sites: &[&str], param_codes: &[&str], period: &str) -> String {
    format!(
        "{}?sites={}&parameterCd={}&period={}&format=json&siteStatus=active",
        IV_BASE_URL,
        sites.join(","),
        param_codes.join(","),
        period,
    )
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetches the last week of discharge, temperature and stage for one site.
pub fn fetch_site_series(
    client: &reqwest::blocking::Client,
    site: &str,
    timeout: Duration,
) -> Result<SeriesSet, FetchError> {
    let url = build_iv_url(
        &[site],
        &[PARAM_DISCHARGE, PARAM_WATER_TEMP, PARAM_STAGE],
        DEFAULT_PERIOD,
    );
    let body = http::get_text(client, &url, timeout, Provider::Usgs, site)?;
    Ok(parse_iv_series(&body, site))
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a USGS IV API JSON response into a `SeriesSet`.
///
/// Recognised parameter codes are routed to their series (`00060`
/// discharge, `00010` water temperature converted to °F, `00065` gage
/// height); anything else is ignored. Sentinel and non-numeric values are
/// dropped. Output is in source order.
///
/// Never fails: a malformed body is logged and yields an empty set.
pub fn parse_iv_series(json: &str, site: &str) -> SeriesSet {
    match try_parse_iv_series(json, site) {
        Ok(series) => series,
        Err(e) => {
            logging::log_fetch_failure("USGS parse", &e);
            SeriesSet::default()
        }
    }
}

fn try_parse_iv_series(json: &str, site: &str) -> Result<SeriesSet, FetchError> {
    let response: IvResponse = serde_json::from_str(json).map_err(|e| FetchError::ParseError {
        provider: Provider::Usgs,
        id: site.to_string(),
        message: format!("JSON deserialization failed: {}", e),
    })?;

    let mut series = SeriesSet::default();

    for ts in response.value.time_series {
        let Some(code) = ts.variable.variable_code.first().map(|c| c.value.as_str()) else {
            continue;
        };

        let target = match code {
            PARAM_DISCHARGE => &mut series.discharge,
            PARAM_WATER_TEMP => &mut series.water_temp,
            PARAM_STAGE => &mut series.gage_height,
            _ => continue,
        };
        let convert: fn(f64) -> f64 = if code == PARAM_WATER_TEMP { c_to_f } else { |v| v };
        let no_data = ts.variable.no_data_value.unwrap_or(MISSING_VALUE_SENTINEL);

        for entry in ts.values.iter().flat_map(|v| v.value.iter()) {
            let Some(raw) = numeric_value(&entry.value) else {
                continue;
            };
            if (raw - no_data).abs() < 0.1 {
                continue;
            }
            let Some(time) = parse_timestamp(&entry.date_time) else {
                logging::debug(
                    DataSource::Usgs,
                    Some(site),
                    &format!("skipping unparsable dateTime '{}'", entry.date_time),
                );
                continue;
            };
            if let Some(sample) = Sample::new(time, convert(raw)) {
                target.push(sample);
            }
        }
    }

    Ok(series)
}

/// USGS sends numbers as strings, occasionally with qualifier text in
/// place of a number ("Ice", "Eqp").
fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use chrono::TimeZone;

    // --- URL construction ---------------------------------------------------

    #[test]
    fn test_build_url_targets_iv_endpoint_with_json_format() {
        let url = build_iv_url(&["12484500"], &[PARAM_DISCHARGE, PARAM_STAGE], "P7D");
        assert!(
            url.contains("waterservices.usgs.gov/nwis/iv/"),
            "must target the IV endpoint, got: {}",
            url
        );
        assert!(url.contains("format=json"), "must request JSON format");
    }

    #[test]
    fn test_build_url_includes_all_params() {
        let url = build_iv_url(
            &["12484500"],
            &[PARAM_DISCHARGE, PARAM_WATER_TEMP, PARAM_STAGE],
            "P7D",
        );
        assert!(url.contains("12484500"), "must include site code");
        assert!(url.contains("parameterCd=00060,00010,00065"), "got: {}", url);
        assert!(url.contains("period=P7D"), "must include ISO 8601 period");
        assert!(url.contains("siteStatus=active"), "should filter to active sites");
    }

    #[test]
    fn test_build_url_uses_comma_separated_sites() {
        let url = build_iv_url(&["12484500", "12505000"], &[PARAM_DISCHARGE], "PT1H");
        assert!(url.contains("sites=12484500,12505000"), "got: {}", url);
    }

    // --- Parsing: happy path ------------------------------------------------

    #[test]
    fn test_parse_discharge_drops_sentinel() {
        let series = parse_iv_series(fixture_usgs_umtanum_json(), "12484500");
        let values: Vec<f64> = series.discharge.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3120.0, 3150.0], "sentinel -999999 must be excluded");
    }

    #[test]
    fn test_parse_converts_water_temp_to_fahrenheit() {
        let series = parse_iv_series(fixture_usgs_umtanum_json(), "12484500");
        assert_eq!(series.water_temp.len(), 1, "non-numeric 'Eqp' must be dropped");
        assert!(
            (series.water_temp[0].value - 54.5).abs() < 1e-9,
            "12.5 °C should be 54.5 °F, got {}",
            series.water_temp[0].value
        );
    }

    #[test]
    fn test_parse_routes_stage_and_ignores_unknown_codes() {
        let series = parse_iv_series(fixture_usgs_umtanum_json(), "12484500");
        assert_eq!(series.gage_height.len(), 1);
        assert!((series.gage_height[0].value - 4.21).abs() < 1e-9);
        assert!(series.forecast.is_empty(), "00045 precipitation is not tracked");
    }

    #[test]
    fn test_parse_timestamps_honour_offset() {
        let series = parse_iv_series(fixture_usgs_umtanum_json(), "12484500");
        assert_eq!(
            series.discharge[0].time,
            Utc.with_ymd_and_hms(2026, 2, 18, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_numeric_json_values_are_accepted() {
        let json = r#"{"value":{"timeSeries":[{
            "variable":{"variableCode":[{"value":"00060"}],"noDataValue":-999999.0},
            "values":[{"value":[{"value":250.5,"dateTime":"2026-02-18T09:00:00.000-08:00"}]}]
        }]}}"#;
        let series = parse_iv_series(json, "12479500");
        assert_eq!(series.discharge.len(), 1);
        assert_eq!(series.discharge[0].value, 250.5);
    }

    // --- Parsing: error and edge cases --------------------------------------

    #[test]
    fn test_parse_empty_value_array_yields_empty_discharge() {
        let series = parse_iv_series(fixture_usgs_empty_json(), "12479500");
        assert!(series.discharge.is_empty());
        assert!(series.is_empty());
    }

    #[test]
    fn test_parse_malformed_json_yields_empty_set() {
        let series = parse_iv_series("{ this is not valid json }}}", "12484500");
        assert_eq!(series, SeriesSet::default());
    }

    #[test]
    fn test_parse_empty_string_yields_empty_set() {
        assert!(parse_iv_series("", "12484500").is_empty());
    }

    #[test]
    fn test_parse_missing_values_field_yields_empty_set() {
        let json = r#"{
          "value": {
            "timeSeries": [{
              "sourceInfo": { "siteName": "Test", "siteCode": [{ "value": "99999999" }] },
              "variable": {
                "variableCode": [{ "value": "00060", "network": "NWIS" }],
                "noDataValue": -999999.0
              }
            }]
          }
        }"#;
        assert!(parse_iv_series(json, "99999999").discharge.is_empty());
    }
}
