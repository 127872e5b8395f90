/// NWS National Water Prediction Service (NWPS) stageflow client.
///
/// Supplies the forecast discharge overlay. The `forecast.data` entries
/// carry flow in `secondary`, expressed in thousands of cfs (kcfs).
///
/// Endpoint: https://api.water.noaa.gov/nwps/v1/gauges/{lid}/stageflow

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::logging;
use crate::model::{FetchError, Provider, Sample};

use super::http;

const NWPS_BASE_URL: &str = "https://api.water.noaa.gov/nwps/v1";

#[derive(Deserialize)]
struct StageflowResponse {
    forecast: Option<ForecastBlock>,
}

#[derive(Deserialize)]
struct ForecastBlock {
    #[serde(default)]
    data: Vec<ForecastEntry>,
}

#[derive(Deserialize)]
struct ForecastEntry {
    #[serde(rename = "validTime")]
    valid_time: String,
    secondary: Option<f64>,
}

pub fn build_url(lid: &str) -> String {
    format!("{}/gauges/{}/stageflow", NWPS_BASE_URL, urlencoding::encode(lid))
}

pub fn fetch_forecast_flow(
    client: &reqwest::blocking::Client,
    lid: &str,
    timeout: Duration,
) -> Result<Vec<Sample>, FetchError> {
    let body = http::get_text(client, &build_url(lid), timeout, Provider::Nwps, lid)?;
    Ok(parse_forecast_flow(&body, lid))
}

/// Parses the forecast block into cfs samples: null flows are skipped,
/// kcfs are multiplied by 1000 and rounded, and entries with an unparsable
/// `validTime` or a negative result are discarded.
///
/// Never fails: a malformed body is logged and yields an empty list.
pub fn parse_forecast_flow(json: &str, lid: &str) -> Vec<Sample> {
    let response: StageflowResponse = match serde_json::from_str(json) {
        Ok(r) => r,
        Err(e) => {
            logging::log_fetch_failure(
                "NWPS parse",
                &FetchError::ParseError {
                    provider: Provider::Nwps,
                    id: lid.to_string(),
                    message: e.to_string(),
                },
            );
            return Vec::new();
        }
    };

    response
        .forecast
        .map(|f| f.data)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let kcfs = entry.secondary?;
            let time = DateTime::parse_from_rfc3339(&entry.valid_time)
                .ok()?
                .with_timezone(&Utc);
            let cfs = (kcfs * 1000.0).round();
            if cfs < 0.0 {
                return None;
            }
            Sample::new(time, cfs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::fixture_nwps_parker_json;
    use chrono::TimeZone;

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("PARW1"),
            "https://api.water.noaa.gov/nwps/v1/gauges/PARW1/stageflow"
        );
    }

    #[test]
    fn test_parse_scales_kcfs_and_filters_bad_entries() {
        let samples = parse_forecast_flow(fixture_nwps_parker_json(), "PARW1");
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1234.0, 1500.0], "null, bad time, negative dropped");
        assert_eq!(samples[0].time, Utc.with_ymd_and_hms(2026, 2, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_missing_forecast_block_is_empty() {
        assert!(parse_forecast_flow(r#"{"observed":{"data":[]}}"#, "PARW1").is_empty());
    }

    #[test]
    fn test_parse_malformed_body_is_empty() {
        assert!(parse_forecast_flow("<html>502 Bad Gateway</html>", "PARW1").is_empty());
    }
}
