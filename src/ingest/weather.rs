/// Weather forecast client.
///
/// Two provider variants are deployed and both response shapes are accepted:
///
/// - **Point forecast** (`kind = "point_forecast"`): parallel arrays keyed by
///   variable name, one entry per 3-hour step over ~10 days, SI units
///   (Kelvin, m/s wind components, metres of precipitation). No condition
///   code; conditions are derived.
/// - **Open-Meteo** (`kind = "open_meteo"`): separate `current` and `daily`
///   blocks, Celsius, m/s, inches, plus a WMO weather code.
///
/// The body is parsed at the boundary into a tagged union discriminated by
/// which fields are present, then normalised into `WeatherReading`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::analysis::conditions::{classify_conditions, condition_from_wmo};
use crate::config::{WeatherProviderConfig, WeatherProviderKind};
use crate::convert::{c_to_f, k_to_f, m_to_in, ms_to_mph, round1, wind_chill_f};
use crate::logging::{self, DataSource};
use crate::model::{CurrentConditions, DailySummary, FetchError, Provider, WeatherReading};
use crate::stations::WeatherLocation;

use super::{REFERENCE_TZ, http, parse_local_datetime};

const POINT_FORECAST_URL: &str = "https://api.windy.com/api/point-forecast/v2";
const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Days shown in the outlook.
pub const MAX_DAILY_ENTRIES: usize = 7;

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum WeatherPayload {
    Blocks(BlockForecast),
    Series(PointForecast),
}

#[derive(Deserialize)]
struct PointForecast {
    /// Step times, ms since epoch.
    ts: Vec<i64>,
    #[serde(rename = "temp-surface")]
    temp_k: Vec<Option<f64>>,
    #[serde(rename = "wind_u-surface", default)]
    wind_u: Vec<Option<f64>>,
    #[serde(rename = "wind_v-surface", default)]
    wind_v: Vec<Option<f64>>,
    #[serde(rename = "gust-surface", default)]
    gust: Vec<Option<f64>>,
    #[serde(rename = "rh-surface", default)]
    rh: Vec<Option<f64>>,
    #[serde(rename = "past3hprecip-surface", default)]
    precip_m: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct BlockForecast {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<u8>,
    wind_speed_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
}

#[derive(Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Canonical forecast step
// ---------------------------------------------------------------------------

/// One forecast timestep in display units.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub time: DateTime<Utc>,
    pub temp_f: f64,
    pub wind_mph: f64,
    pub gust_mph: Option<f64>,
    pub humidity_pct: Option<f64>,
    /// Precipitation accumulated over the step, inches.
    pub precip_in: f64,
}

fn at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

impl PointForecast {
    /// Steps without a timestamp or temperature are skipped.
    fn into_steps(self) -> Vec<ForecastStep> {
        self.ts
            .iter()
            .enumerate()
            .filter_map(|(i, &ms)| {
                let time = DateTime::from_timestamp_millis(ms)?;
                let temp_k = at(&self.temp_k, i).filter(|t| t.is_finite())?;
                let wind_ms = match (at(&self.wind_u, i), at(&self.wind_v, i)) {
                    (Some(u), Some(v)) => u.hypot(v),
                    _ => 0.0,
                };
                Some(ForecastStep {
                    time,
                    temp_f: k_to_f(temp_k),
                    wind_mph: ms_to_mph(wind_ms),
                    gust_mph: at(&self.gust, i).map(ms_to_mph),
                    humidity_pct: at(&self.rh, i),
                    precip_in: at(&self.precip_m, i).map(m_to_in).unwrap_or(0.0).max(0.0),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Current conditions
// ---------------------------------------------------------------------------

/// Index of the latest step at or before `now`; on equal timestamps the
/// later index wins. When every step is in the future (clock skew) this
/// falls back to the first step.
pub fn current_index_at(steps: &[ForecastStep], now: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, step) in steps.iter().enumerate() {
        if step.time <= now && best.is_none_or(|b| step.time >= steps[b].time) {
            best = Some(i);
        }
    }
    if best.is_none() && !steps.is_empty() {
        logging::warn(
            DataSource::Weather,
            None,
            "no forecast step at or before now; using first step as current",
        );
        return Some(0);
    }
    best
}

/// Current conditions from one step, with wind chill applied when cold and
/// windy enough and a derived condition.
pub fn current_from_step(step: &ForecastStep) -> CurrentConditions {
    CurrentConditions {
        observed_at: step.time,
        temperature_f: round1(step.temp_f),
        feels_like_f: round1(wind_chill_f(step.temp_f, step.wind_mph)),
        wind_mph: round1(step.wind_mph),
        gust_mph: step.gust_mph.map(round1),
        humidity_pct: step.humidity_pct,
        precip_in: step.precip_in,
        condition: classify_conditions(step.temp_f, step.precip_in, step.humidity_pct),
    }
}

// ---------------------------------------------------------------------------
// Daily aggregation
// ---------------------------------------------------------------------------

/// Groups steps by Pacific calendar date: max temperature is the high, min
/// the low, precipitation is summed. Ascending by date, at most seven days.
pub fn daily_from_steps(steps: &[ForecastStep]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, (f64, f64, f64)> = BTreeMap::new();
    for step in steps {
        let date = step.time.with_timezone(&REFERENCE_TZ).date_naive();
        let entry = days
            .entry(date)
            .or_insert((f64::NEG_INFINITY, f64::INFINITY, 0.0));
        entry.0 = entry.0.max(step.temp_f);
        entry.1 = entry.1.min(step.temp_f);
        entry.2 += step.precip_in;
    }

    days.into_iter()
        .take(MAX_DAILY_ENTRIES)
        .map(|(date, (high, low, precip))| daily_summary(date, high, low, precip))
        .collect()
}

fn daily_summary(date: NaiveDate, high_f: f64, low_f: f64, precip_in: f64) -> DailySummary {
    DailySummary {
        date,
        label: date.format("%a").to_string(),
        high_f: round1(high_f),
        low_f: round1(low_f),
        precip_in: (precip_in * 100.0).round() / 100.0,
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses either provider variant into a `WeatherReading`, choosing current
/// conditions relative to `now`.
pub fn parse_weather_at(
    json: &str,
    location_id: &str,
    now: DateTime<Utc>,
) -> Result<WeatherReading, FetchError> {
    let payload: WeatherPayload = serde_json::from_str(json).map_err(|e| FetchError::ParseError {
        provider: Provider::Weather,
        id: location_id.to_string(),
        message: format!("unrecognised forecast shape: {}", e),
    })?;

    match payload {
        WeatherPayload::Series(forecast) => {
            let steps = forecast.into_steps();
            let current = current_index_at(&steps, now).map(|i| current_from_step(&steps[i]));
            Ok(WeatherReading { current, daily: daily_from_steps(&steps) })
        }
        WeatherPayload::Blocks(blocks) => Ok(reading_from_blocks(blocks, location_id)),
    }
}

fn reading_from_blocks(blocks: BlockForecast, location_id: &str) -> WeatherReading {
    let c = blocks.current;
    let current = match parse_local_datetime(&c.time) {
        Some(observed_at) => {
            let temp_f = c_to_f(c.temperature_2m);
            let wind_mph = c.wind_speed_10m.map(ms_to_mph).unwrap_or(0.0);
            let precip_in = c.precipitation.unwrap_or(0.0).max(0.0);
            let feels_like_f = c
                .apparent_temperature
                .map(c_to_f)
                .unwrap_or_else(|| wind_chill_f(temp_f, wind_mph));
            let condition = match c.weather_code {
                Some(code) => condition_from_wmo(code),
                None => classify_conditions(temp_f, precip_in, c.relative_humidity_2m),
            };
            Some(CurrentConditions {
                observed_at,
                temperature_f: round1(temp_f),
                feels_like_f: round1(feels_like_f),
                wind_mph: round1(wind_mph),
                gust_mph: c.wind_gusts_10m.map(|g| round1(ms_to_mph(g))),
                humidity_pct: c.relative_humidity_2m,
                precip_in,
                condition,
            })
        }
        None => {
            logging::warn(
                DataSource::Weather,
                Some(location_id),
                &format!("unparsable current time '{}'", c.time),
            );
            None
        }
    };

    let d = blocks.daily;
    let mut daily: Vec<DailySummary> = d
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, day)| {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
            let high = c_to_f(at(&d.temperature_2m_max, i)?);
            let low = c_to_f(at(&d.temperature_2m_min, i)?);
            let precip = at(&d.precipitation_sum, i).unwrap_or(0.0);
            Some(daily_summary(date, high, low, precip))
        })
        .collect();
    daily.sort_by_key(|day| day.date);
    daily.truncate(MAX_DAILY_ENTRIES);

    WeatherReading { current, daily }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// JSON body for a point-forecast request.
pub fn point_forecast_body(
    location: &WeatherLocation,
    provider: &WeatherProviderConfig,
) -> serde_json::Value {
    serde_json::json!({
        "lat": location.latitude,
        "lon": location.longitude,
        "model": provider.model,
        "parameters": ["temp", "wind", "windGust", "rh", "precip"],
        "levels": ["surface"],
        "key": provider.api_key.as_deref().unwrap_or_default(),
    })
}

/// Query URL for an Open-Meteo request.
pub fn open_meteo_url(location: &WeatherLocation, provider: &WeatherProviderConfig) -> String {
    let model = match provider.model.as_str() {
        "gfs" => "gfs_seamless",
        other => other,
    };
    format!(
        "{}?latitude={}&longitude={}&models={}\
         &current=temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m,wind_gusts_10m\
         &daily=temperature_2m_max,temperature_2m_min,precipitation_sum\
         &wind_speed_unit=ms&precipitation_unit=inch&forecast_days={}&timezone={}",
        OPEN_METEO_URL,
        location.latitude,
        location.longitude,
        model,
        MAX_DAILY_ENTRIES,
        urlencoding::encode(REFERENCE_TZ.name()),
    )
}

pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    location: &WeatherLocation,
    provider: &WeatherProviderConfig,
    timeout: Duration,
) -> Result<WeatherReading, FetchError> {
    let body = match provider.kind {
        WeatherProviderKind::PointForecast => http::post_json_text(
            client,
            POINT_FORECAST_URL,
            &point_forecast_body(location, provider),
            timeout,
            Provider::Weather,
            &location.id,
        )?,
        WeatherProviderKind::OpenMeteo => http::get_text(
            client,
            &open_meteo_url(location, provider),
            timeout,
            Provider::Weather,
            &location.id,
        )?,
    };
    parse_weather_at(&body, &location.id, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::{fixture_open_meteo_json, fixture_point_forecast_json};
    use crate::model::Condition;
    use chrono::TimeZone;

    fn yakima() -> WeatherLocation {
        WeatherLocation {
            id: "yakima".to_string(),
            name: "Yakima".to_string(),
            latitude: 46.6021,
            longitude: -120.5059,
        }
    }

    // --- point forecast -----------------------------------------------------

    #[test]
    fn test_point_forecast_current_is_latest_past_step() {
        // between the 21:00Z and 00:00Z steps
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 22, 0, 0).unwrap();
        let reading = parse_weather_at(fixture_point_forecast_json(), "yakima", now)
            .expect("point forecast should parse");
        let current = reading.current.expect("should have current conditions");

        assert_eq!(current.observed_at, Utc.with_ymd_and_hms(2026, 2, 18, 21, 0, 0).unwrap());
        assert_eq!(current.temperature_f, 32.0);
        assert_eq!(current.wind_mph, 11.2, "5 m/s from u=4, v=3");
        assert!(current.feels_like_f < current.temperature_f, "wind chill applies at 32°F");
        assert_eq!(current.condition, Condition::PartlyCloudy, "dry, 80% humidity");
    }

    #[test]
    fn test_point_forecast_precip_step_classifies_snow() {
        let now = Utc.with_ymd_and_hms(2026, 2, 19, 3, 30, 0).unwrap();
        let reading = parse_weather_at(fixture_point_forecast_json(), "yakima", now).unwrap();
        let current = reading.current.unwrap();
        assert!((current.precip_in - 0.1).abs() < 1e-3, "2.54 mm is 0.1 in");
        assert_eq!(current.condition, Condition::Snow, "30.2°F with precipitation");
    }

    #[test]
    fn test_point_forecast_all_future_falls_back_to_first_step() {
        let now = Utc.with_ymd_and_hms(2026, 2, 17, 0, 0, 0).unwrap();
        let reading = parse_weather_at(fixture_point_forecast_json(), "yakima", now).unwrap();
        let current = reading.current.expect("falls back to first step");
        assert_eq!(current.observed_at, Utc.with_ymd_and_hms(2026, 2, 18, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_point_forecast_daily_grouped_by_pacific_date() {
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 22, 0, 0).unwrap();
        let reading = parse_weather_at(fixture_point_forecast_json(), "yakima", now).unwrap();

        assert_eq!(reading.daily.len(), 2);
        let today = &reading.daily[0];
        assert_eq!(today.date, NaiveDate::from_ymd_opt(2026, 2, 18).unwrap());
        assert_eq!(today.label, "Wed");
        assert_eq!(today.high_f, 35.6);
        assert_eq!(today.low_f, 26.6);
        assert_eq!(today.precip_in, 0.16);

        let tomorrow = &reading.daily[1];
        assert_eq!(tomorrow.high_f, 23.0);
        assert_eq!(tomorrow.low_f, 23.0);
        assert_eq!(tomorrow.precip_in, 0.0);
    }

    #[test]
    fn test_current_index_prefers_later_index_on_equal_times() {
        let t = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let step = |temp_f| ForecastStep {
            time: t,
            temp_f,
            wind_mph: 0.0,
            gust_mph: None,
            humidity_pct: None,
            precip_in: 0.0,
        };
        let steps = vec![step(40.0), step(41.0)];
        assert_eq!(current_index_at(&steps, t), Some(1));
        assert_eq!(current_index_at(&[], t), None);
    }

    #[test]
    fn test_daily_truncates_to_seven_days() {
        let start = Utc.with_ymd_and_hms(2026, 2, 18, 20, 0, 0).unwrap();
        let steps: Vec<ForecastStep> = (0..10)
            .map(|d| ForecastStep {
                time: start + chrono::Duration::days(d),
                temp_f: 40.0,
                wind_mph: 0.0,
                gust_mph: None,
                humidity_pct: None,
                precip_in: 0.0,
            })
            .collect();
        let daily = daily_from_steps(&steps);
        assert_eq!(daily.len(), 7);
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    // --- Open-Meteo ---------------------------------------------------------

    #[test]
    fn test_open_meteo_blocks_are_normalised() {
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 18, 5, 0).unwrap();
        let reading = parse_weather_at(fixture_open_meteo_json(), "yakima", now).unwrap();
        let current = reading.current.expect("current block");

        assert_eq!(current.observed_at, Utc.with_ymd_and_hms(2026, 2, 18, 18, 0, 0).unwrap());
        assert_eq!(current.temperature_f, 30.2);
        assert_eq!(current.feels_like_f, 22.1);
        assert_eq!(current.wind_mph, 11.2);
        assert_eq!(current.gust_mph, Some(20.1));
        assert_eq!(current.humidity_pct, Some(85.0));
        assert_eq!(current.condition, Condition::Snow, "WMO 73 is snow");

        assert_eq!(reading.daily.len(), 7, "8 days truncated to 7");
        assert_eq!(reading.daily[0].high_f, 35.6);
        assert_eq!(reading.daily[0].low_f, 24.8);
        assert_eq!(reading.daily[0].precip_in, 0.12);
        assert_eq!(reading.daily[4].precip_in, 0.0, "null precipitation counts as none");
    }

    #[test]
    fn test_unrecognised_shape_is_parse_error() {
        let now = Utc::now();
        let result = parse_weather_at(r#"{"hourly": {"time": []}}"#, "yakima", now);
        assert!(matches!(result, Err(FetchError::ParseError { .. })));
        let result = parse_weather_at("not json", "yakima", now);
        assert!(matches!(result, Err(FetchError::ParseError { .. })));
    }

    // --- requests -----------------------------------------------------------

    #[test]
    fn test_open_meteo_url_requests_expected_units() {
        let url = open_meteo_url(&yakima(), &WeatherProviderConfig::default());
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=46.6021"));
        assert!(url.contains("wind_speed_unit=ms"));
        assert!(url.contains("precipitation_unit=inch"));
        assert!(url.contains("models=gfs_seamless"));
        assert!(url.contains("timezone=America%2FLos_Angeles"));
    }

    #[test]
    fn test_point_forecast_body_selects_model_and_variables() {
        let body = point_forecast_body(&yakima(), &WeatherProviderConfig::default());
        assert_eq!(body["model"], "gfs");
        assert_eq!(body["lat"], 46.6021);
        assert!(body["parameters"].as_array().unwrap().iter().any(|p| p == "windGust"));
    }
}
