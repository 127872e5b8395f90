/// Data analysis for the Yakima basin dashboard.
///
/// Submodules:
/// - `series`     — latest value, 24h trend, chart downsampling, nearest-time alignment.
/// - `conditions` — weather condition heuristic and WMO code mapping.

pub mod conditions;
pub mod series;
