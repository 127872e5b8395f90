/// Station and weather-location definitions for the Yakima basin dashboard.
///
/// A station is static configuration: where it is, how it is drawn, and
/// which identifier each upstream provider knows it by. Stations are loaded
/// from `dashboard.toml` (see `config`); this module only defines the types
/// and the lookups the rest of the service uses.

use serde::{Deserialize, Serialize};

use crate::model::Provider;

pub use crate::model::{PARAM_DISCHARGE, PARAM_STAGE, PARAM_WATER_TEMP};

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// A gauge location, with up to one identifier per provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Station {
    /// Dashboard-local key, e.g. `"umtanum"`.
    pub id: String,
    pub name: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Marker and chart color, CSS hex.
    pub color: String,
    /// 8-digit USGS site code (primary gauge source).
    #[serde(default)]
    pub usgs: Option<String>,
    /// USBR hydromet station code, e.g. `"easw"`.
    #[serde(default)]
    pub usbr: Option<String>,
    /// NWRFC station id for supplemental water temperature, e.g. `"UMTW1"`.
    #[serde(default)]
    pub nwrfc: Option<String>,
    /// NWS NWPS gauge id (LID) for forecast flow.
    #[serde(default)]
    pub nwps: Option<String>,
}

impl Station {
    /// The identifier `provider` knows this station by. Blank entries count
    /// as absent.
    pub fn identifier(&self, provider: Provider) -> Option<&str> {
        let id = match provider {
            Provider::Usgs => &self.usgs,
            Provider::Usbr => &self.usbr,
            Provider::Nwrfc => &self.nwrfc,
            Provider::Nwps => &self.nwps,
            Provider::Weather | Provider::Alerts => return None,
        };
        id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// A station with no provider identifiers can never produce data.
    pub fn has_identifier(&self) -> bool {
        [Provider::Usgs, Provider::Usbr, Provider::Nwrfc, Provider::Nwps]
            .into_iter()
            .any(|p| self.identifier(p).is_some())
    }
}

/// A point the weather cards forecast for.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherLocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Looks up a station by its dashboard id.
pub fn find_station<'a>(stations: &'a [Station], id: &str) -> Option<&'a Station> {
    stations.iter().find(|s| s.id == id)
}

/// Returns `true` if `code` is a well-formed USGS site number
/// (8 to 15 ASCII digits).
pub fn is_valid_usgs_code(code: &str) -> bool {
    (8..=15).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn test_station(id: &str) -> Station {
    Station {
        id: id.to_string(),
        name: format!("Test station {}", id),
        latitude: 46.8,
        longitude: -120.5,
        color: "#1f77b4".to_string(),
        usgs: None,
        usbr: None,
        nwrfc: None,
        nwps: None,
    }
}
