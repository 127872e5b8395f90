/// Weather and hazard reconciliation.
///
/// A failed forecast fetch is recorded as an empty reading ("no data") so
/// the location's slot still gets updated; a failed alerts fetch is an
/// empty list.

use crate::ingest::WeatherSources;
use crate::logging::{self, DataSource};
use crate::model::{Alert, WeatherReading};
use crate::stations::WeatherLocation;

pub fn reconcile_weather(sources: &dyn WeatherSources, location: &WeatherLocation) -> WeatherReading {
    match sources.forecast(location) {
        Ok(reading) => {
            if !reading.has_data() {
                logging::info(DataSource::Weather, Some(&location.id), "forecast contained no usable steps");
            }
            reading
        }
        Err(e) => {
            logging::log_fetch_failure("Weather forecast fetch", &e);
            WeatherReading::default()
        }
    }
}

pub fn reconcile_alerts(sources: &dyn WeatherSources) -> Vec<Alert> {
    match sources.alerts() {
        Ok(alerts) => {
            logging::debug(DataSource::Alerts, None, &format!("{} active basin alerts", alerts.len()));
            alerts
        }
        Err(e) => {
            logging::log_fetch_failure("NWS alerts fetch", &e);
            Vec::new()
        }
    }
}
