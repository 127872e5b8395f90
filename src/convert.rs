/// Unit conversions between the providers' native units and the US
/// customary units the dashboard displays.

/// Degrees Celsius to degrees Fahrenheit.
pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Kelvin to degrees Fahrenheit.
pub fn k_to_f(kelvin: f64) -> f64 {
    c_to_f(kelvin - 273.15)
}

/// Meters (of precipitation) to inches.
pub fn m_to_in(meters: f64) -> f64 {
    meters * 39.3701
}

/// Meters per second to miles per hour.
pub fn ms_to_mph(ms: f64) -> f64 {
    ms * 2.236_936
}

/// Apparent temperature using the NWS wind-chill formula.
///
/// Only defined for temperature <= 50°F and wind >= 3 mph; outside that
/// range the air temperature is returned unchanged.
pub fn wind_chill_f(temp_f: f64, wind_mph: f64) -> f64 {
    if temp_f > 50.0 || wind_mph < 3.0 {
        return temp_f;
    }
    let v = wind_mph.powf(0.16);
    35.74 + 0.6215 * temp_f - 35.75 * v + 0.4275 * temp_f * v
}

/// Rounds to one decimal place, the precision shown on metric cards.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
