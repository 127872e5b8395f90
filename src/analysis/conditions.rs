/// Weather condition classification.
///
/// The point-forecast provider has no condition code, so one is derived
/// from temperature, recent precipitation and humidity. Open-Meteo sends a
/// WMO code, which maps onto the same `Condition` set.

use crate::model::Condition;

/// Precipitation above this (inches, most recent step) counts as falling.
pub const PRECIP_THRESHOLD_IN: f64 = 0.01;

/// Derives a condition from current temperature (°F), recent precipitation
/// (inches) and relative humidity (%).
pub fn classify_conditions(temp_f: f64, precip_in: f64, humidity_pct: Option<f64>) -> Condition {
    if precip_in > PRECIP_THRESHOLD_IN {
        return if temp_f <= 32.0 {
            Condition::Snow
        } else if temp_f <= 36.0 {
            Condition::Mix
        } else {
            Condition::Rain
        };
    }
    match humidity_pct {
        Some(h) if h > 88.0 => Condition::Overcast,
        Some(h) if h > 68.0 => Condition::PartlyCloudy,
        _ => Condition::Clear,
    }
}

/// Maps a WMO weather interpretation code (as used by Open-Meteo).
pub fn condition_from_wmo(code: u8) -> Condition {
    match code {
        0 | 1 => Condition::Clear,
        2 => Condition::PartlyCloudy,
        3 => Condition::Overcast,
        45 | 48 => Condition::Fog,
        51 | 53 | 55 => Condition::Drizzle,
        56 | 57 | 66 | 67 => Condition::Mix,
        61 | 63 | 65 | 80 | 81 | 82 => Condition::Rain,
        71 | 73 | 75 | 77 | 85 | 86 => Condition::Snow,
        95 | 96 | 99 => Condition::Thunderstorm,
        _ => Condition::Overcast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precipitation_type_by_temperature_band() {
        assert_eq!(classify_conditions(30.0, 0.05, Some(95.0)), Condition::Snow);
        assert_eq!(classify_conditions(32.0, 0.05, None), Condition::Snow);
        assert_eq!(classify_conditions(34.0, 0.05, None), Condition::Mix);
        assert_eq!(classify_conditions(36.0, 0.05, None), Condition::Mix);
        assert_eq!(classify_conditions(45.0, 0.05, None), Condition::Rain);
    }

    #[test]
    fn test_trace_precipitation_falls_through_to_humidity() {
        assert_eq!(classify_conditions(45.0, 0.01, Some(90.0)), Condition::Overcast);
    }

    #[test]
    fn test_humidity_bands() {
        assert_eq!(classify_conditions(60.0, 0.0, Some(89.0)), Condition::Overcast);
        assert_eq!(classify_conditions(60.0, 0.0, Some(88.0)), Condition::PartlyCloudy);
        assert_eq!(classify_conditions(60.0, 0.0, Some(69.0)), Condition::PartlyCloudy);
        assert_eq!(classify_conditions(60.0, 0.0, Some(68.0)), Condition::Clear);
        assert_eq!(classify_conditions(60.0, 0.0, None), Condition::Clear);
    }

    #[test]
    fn test_wmo_codes() {
        assert_eq!(condition_from_wmo(0), Condition::Clear);
        assert_eq!(condition_from_wmo(2), Condition::PartlyCloudy);
        assert_eq!(condition_from_wmo(45), Condition::Fog);
        assert_eq!(condition_from_wmo(63), Condition::Rain);
        assert_eq!(condition_from_wmo(73), Condition::Snow);
        assert_eq!(condition_from_wmo(66), Condition::Mix);
        assert_eq!(condition_from_wmo(95), Condition::Thunderstorm);
    }
}
