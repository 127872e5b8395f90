///the payload fixture strings, cfg(test) gated
///
/// Test fixtures: representative response bodies from every upstream
/// provider the dashboard polls.
///
/// These fixtures are structurally complete but truncated to the minimum
/// needed to exercise the parsers. They reflect the real shapes returned by:
///   USGS   https://waterservices.usgs.gov/nwis/iv/?format=json&...
///   USBR   https://www.usbr.gov/pn-bin/instant.pl?format=csv&...
///   NWRFC  https://www.nwrfc.noaa.gov/station/flowplot/textPlot.cgi?...
///   NWPS   https://api.water.noaa.gov/nwps/v1/gauges/{lid}/stageflow
///   Weather point forecast (parallel arrays) and Open-Meteo (blocks)
///   NWS    https://api.weather.gov/alerts/active?area=WA
///
/// Note: USGS measurement values are JSON strings even though they represent
/// numbers, and the sentinel `-999999` marks a missing reading.

/// Umtanum (12484500): two discharge values plus one sentinel, one valid
/// temperature (12.5 °C) plus one non-numeric, one stage value, and a
/// precipitation series the dashboard does not track.
#[cfg(test)]
pub(crate) fn fixture_usgs_umtanum_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "YAKIMA RIVER AT UMTANUM, WA",
              "siteCode": [{ "value": "12484500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00060", "network": "NWIS" }],
              "unit": { "unitCode": "ft3/s" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "3120", "qualifiers": ["P"], "dateTime": "2026-02-18T09:00:00.000-08:00" },
                { "value": "3150", "qualifiers": ["P"], "dateTime": "2026-02-18T09:15:00.000-08:00" },
                { "value": "-999999", "qualifiers": ["P", "Ice"], "dateTime": "2026-02-18T09:30:00.000-08:00" }
              ]
            }]
          },
          {
            "sourceInfo": {
              "siteName": "YAKIMA RIVER AT UMTANUM, WA",
              "siteCode": [{ "value": "12484500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00010", "network": "NWIS" }],
              "unit": { "unitCode": "deg C" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "12.5", "qualifiers": ["P"], "dateTime": "2026-02-18T09:00:00.000-08:00" },
                { "value": "Eqp", "qualifiers": ["P"], "dateTime": "2026-02-18T09:15:00.000-08:00" }
              ]
            }]
          },
          {
            "sourceInfo": {
              "siteName": "YAKIMA RIVER AT UMTANUM, WA",
              "siteCode": [{ "value": "12484500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "4.21", "qualifiers": ["P"], "dateTime": "2026-02-18T09:00:00.000-08:00" }
              ]
            }]
          },
          {
            "sourceInfo": {
              "siteName": "YAKIMA RIVER AT UMTANUM, WA",
              "siteCode": [{ "value": "12484500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00045", "network": "NWIS" }],
              "unit": { "unitCode": "in" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "0.01", "qualifiers": ["P"], "dateTime": "2026-02-18T09:00:00.000-08:00" }
              ]
            }]
          }
        ]
      }
    }"#
}

/// A site that answers but has no values (seasonal gauge, ice-affected).
#[cfg(test)]
pub(crate) fn fixture_usgs_empty_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "YAKIMA RIVER AT CLE ELUM, WA",
              "siteCode": [{ "value": "12479500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00060", "network": "NWIS" }],
              "unit": { "unitCode": "ft3/s" },
              "noDataValue": -999999.0
            },
            "values": [{ "value": [] }]
          }
        ]
      }
    }"#
}

/// USBR hydromet CSV for Easton (easw). Preamble lines precede the header,
/// one row has an unparsable timestamp, one a negative discharge, one a
/// missing temperature.
#[cfg(test)]
pub(crate) fn fixture_usbr_easton_csv() -> &'static str {
    "<HTML><HEAD><TITLE>Hydromet/AgriMet Data Access</title></head>\n\
     <BODY><PRE>\n\
     USBR Pacific Northwest Region Hydromet instantaneous data\n\
     DateTime,EASW_Q,EASW_TW\n\
     2026-02-18 17:00,320.10,40.5\n\
     2026-02-18 17:15,-5.00,40.8\n\
     garbage,330.00,41.2\n\
     2026-02-18 17:30,326.57,41.0\n\
     2026-02-18 17:45,327.02,\n\
     </PRE></BODY></HTML>\n"
}

/// NWRFC text plot for Umtanum water temperature (°F), in local time.
#[cfg(test)]
pub(crate) fn fixture_nwrfc_umtanum_html() -> &'static str {
    r#"<html><head><title>UMTW1 Water Temperature</title></head>
<body>
<table border="1">
<tr><th>Date/Time (PST)</th><th>Water Temp (F)</th></tr>
<tr><td>2026-02-08 12:00</td><td>38.1</td></tr>
<tr><td>2026-02-18 06:00</td><td>39.2</td></tr>
<tr><td>2026-02-18 12:00</td><td>41.6</td></tr>
<tr><td> 2026-02-18 18:00 </td><td class="val"> 40.3 </td></tr>
<tr><td>Missing</td><td>--</td></tr>
</table>
</body></html>"#
}

/// NWPS stageflow for Parker (PARW1). `secondary` is kcfs; one null and one
/// negative entry.
#[cfg(test)]
pub(crate) fn fixture_nwps_parker_json() -> &'static str {
    r#"{
      "observed": { "primaryUnits": "ft", "secondaryUnits": "kcfs", "data": [] },
      "forecast": {
        "issuedTime": "2026-02-18T16:00:00Z",
        "primaryUnits": "ft",
        "secondaryUnits": "kcfs",
        "data": [
          { "validTime": "2026-02-19T00:00:00Z", "primary": 4.1, "secondary": 1.2344 },
          { "validTime": "2026-02-19T06:00:00Z", "primary": 4.3, "secondary": null },
          { "validTime": "2026-02-19T12:00:00Z", "primary": 4.6, "secondary": 1.5 },
          { "validTime": "not a time", "primary": 4.7, "secondary": 1.6 },
          { "validTime": "2026-02-20T00:00:00Z", "primary": -999, "secondary": -999 }
        ]
      }
    }"#
}

/// Point forecast with parallel arrays at 3-hour steps (ms epoch), SI units.
/// Steps: 2026-02-18 18:00Z, 21:00Z, 2026-02-19 00:00Z, 03:00Z, 06:00Z, 09:00Z.
/// In Pacific time those fall on Feb 18 (10:00, 13:00, 16:00, 19:00, 22:00)
/// and Feb 19 (01:00).
#[cfg(test)]
pub(crate) fn fixture_point_forecast_json() -> &'static str {
    r#"{
      "ts": [1771437600000, 1771448400000, 1771459200000, 1771470000000, 1771480800000, 1771491600000],
      "units": { "temp-surface": "K", "wind_u-surface": "m*s-1", "past3hprecip-surface": "m" },
      "temp-surface":         [271.15, 273.15, 275.15, 272.15, 270.15, 268.15],
      "wind_u-surface":       [3.0, 4.0, 0.0, 1.0, 0.5, 0.0],
      "wind_v-surface":       [4.0, 3.0, 0.0, 0.0, 0.5, 0.0],
      "gust-surface":         [8.0, 9.0, 2.0, 3.0, 2.0, 1.0],
      "rh-surface":           [92.0, 80.0, 70.0, 60.0, 95.0, 90.0],
      "past3hprecip-surface": [0.0005, 0.0, 0.0, 0.00254, 0.001, 0.0]
    }"#
}

/// Open-Meteo style forecast with separate current and daily blocks.
/// Requested with `wind_speed_unit=ms` and `precipitation_unit=inch`.
#[cfg(test)]
pub(crate) fn fixture_open_meteo_json() -> &'static str {
    r#"{
      "latitude": 46.6,
      "longitude": -120.5,
      "timezone": "America/Los_Angeles",
      "current": {
        "time": "2026-02-18T10:00",
        "interval": 900,
        "temperature_2m": -1.0,
        "relative_humidity_2m": 85,
        "apparent_temperature": -5.5,
        "precipitation": 0.02,
        "weather_code": 73,
        "wind_speed_10m": 5.0,
        "wind_gusts_10m": 9.0
      },
      "daily": {
        "time": ["2026-02-18", "2026-02-19", "2026-02-20", "2026-02-21", "2026-02-22", "2026-02-23", "2026-02-24", "2026-02-25"],
        "temperature_2m_max": [2.0, 4.0, 6.0, 5.0, 3.0, 1.0, 0.0, 8.0],
        "temperature_2m_min": [-4.0, -2.0, 0.0, 1.0, -1.0, -3.0, -6.0, 2.0],
        "precipitation_sum": [0.12, 0.0, 0.0, 0.05, null, 0.3, 0.0, 0.0]
      }
    }"#
}

/// NWS active alerts for WA: one Yakima flood watch, one coastal wind
/// advisory, one Kittitas winter storm warning.
#[cfg(test)]
pub(crate) fn fixture_alerts_json() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "properties": {
            "event": "Flood Watch",
            "headline": "Flood Watch issued February 18 at 2:00PM PST by NWS Pendleton OR",
            "areaDesc": "Yakima Valley; Lower Columbia Basin of Washington"
          }
        },
        {
          "properties": {
            "event": "Wind Advisory",
            "headline": "Wind Advisory issued February 18 at 1:00PM PST by NWS Seattle WA",
            "areaDesc": "Central Coast; North Coast"
          }
        },
        {
          "properties": {
            "event": "Winter Storm Warning",
            "headline": null,
            "areaDesc": "East Slopes of the Washington Cascades; Kittitas Valley"
          }
        }
      ]
    }"#
}
