/// Live provider access over HTTP.
///
/// `HttpSources` owns the shared client and the configuration that shapes
/// each request (per-provider timeouts, proxy routing, weather provider,
/// alert filter). The reconciliation layer only sees the traits.

use crate::config::DashboardConfig;
use crate::model::{Alert, FetchError, Provider, Sample, SeriesSet, WeatherReading};
use crate::stations::WeatherLocation;

use super::{StationSources, WeatherSources, alerts, http, nwps, nwrfc, usbr, usgs, weather};

pub struct HttpSources {
    client: reqwest::blocking::Client,
    config: DashboardConfig,
}

impl HttpSources {
    pub fn new(config: DashboardConfig) -> Result<Self, reqwest::Error> {
        Ok(HttpSources { client: http::build_client()?, config })
    }

    fn proxy_base(&self) -> Option<&str> {
        self.config.proxy.base_url.as_deref()
    }
}

impl StationSources for HttpSources {
    fn primary(&self, site: &str) -> Result<SeriesSet, FetchError> {
        usgs::fetch_site_series(&self.client, site, self.config.timeouts.for_provider(Provider::Usgs))
    }

    fn secondary(&self, code: &str) -> Result<SeriesSet, FetchError> {
        usbr::fetch_station_series(
            &self.client,
            code,
            self.proxy_base(),
            self.config.timeouts.for_provider(Provider::Usbr),
        )
    }

    fn supplemental_temperature(&self, code: &str) -> Result<Vec<Sample>, FetchError> {
        nwrfc::fetch_water_temperature(
            &self.client,
            code,
            self.proxy_base(),
            self.config.timeouts.for_provider(Provider::Nwrfc),
        )
    }

    fn forecast_flow(&self, lid: &str) -> Result<Vec<Sample>, FetchError> {
        nwps::fetch_forecast_flow(&self.client, lid, self.config.timeouts.for_provider(Provider::Nwps))
    }
}

impl WeatherSources for HttpSources {
    fn forecast(&self, location: &WeatherLocation) -> Result<WeatherReading, FetchError> {
        weather::fetch_forecast(
            &self.client,
            location,
            &self.config.weather_provider,
            self.config.timeouts.for_provider(Provider::Weather),
        )
    }

    fn alerts(&self) -> Result<Vec<Alert>, FetchError> {
        alerts::fetch_alerts(
            &self.client,
            &self.config.alerts,
            self.config.timeouts.for_provider(Provider::Alerts),
        )
    }
}
