/// NWS active alerts client.
///
/// Endpoint: https://api.weather.gov/alerts/active?area=WA
///
/// The statewide feed is filtered down to hazards that matter in the basin:
/// an alert is kept when its event names one of the configured event
/// keywords AND its `areaDesc` names one of the configured area keywords.
/// Both comparisons are case-insensitive.

use serde::Deserialize;
use std::time::Duration;

use crate::config::AlertConfig;
use crate::model::{Alert, FetchError, Provider};

use super::http;

const NWS_ALERTS_URL: &str = "https://api.weather.gov/alerts/active";

#[derive(Deserialize)]
struct AlertCollection {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Deserialize)]
struct AlertProperties {
    event: Option<String>,
    headline: Option<String>,
    #[serde(rename = "areaDesc")]
    area_desc: Option<String>,
}

pub fn build_url(area: &str) -> String {
    format!("{}?area={}", NWS_ALERTS_URL, urlencoding::encode(area))
}

pub fn fetch_alerts(
    client: &reqwest::blocking::Client,
    config: &AlertConfig,
    timeout: Duration,
) -> Result<Vec<Alert>, FetchError> {
    let body = http::get_text(client, &build_url(&config.area), timeout, Provider::Alerts, &config.area)?;
    parse_alerts(&body, config)
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(&n.to_lowercase()))
}

/// Parses the GeoJSON feed and keeps the basin-relevant alerts, in feed
/// order. A missing headline falls back to the event name.
pub fn parse_alerts(json: &str, config: &AlertConfig) -> Result<Vec<Alert>, FetchError> {
    let collection: AlertCollection = serde_json::from_str(json).map_err(|e| FetchError::ParseError {
        provider: Provider::Alerts,
        id: config.area.clone(),
        message: e.to_string(),
    })?;

    Ok(collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let p = feature.properties;
            let event = p.event.filter(|e| !e.trim().is_empty())?;
            let area = p.area_desc.unwrap_or_default();
            if !contains_any(&event, &config.event_keywords) || !contains_any(&area, &config.area_keywords) {
                return None;
            }
            let headline = p
                .headline
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| event.clone());
            Some(Alert { event, headline })
        })
        .collect())
}
