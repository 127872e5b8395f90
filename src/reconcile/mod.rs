/// Multi-source reconciliation.
///
/// Submodules:
/// - `station` — discharge fallback chain, temperature supplement, forecast overlay.
/// - `weather` — per-location forecast and basin hazard alerts, failing soft.
///
/// Each function produces a complete, fresh reading; callers replace the
/// previous snapshot with it rather than merging.

pub mod station;
pub mod weather;

pub use station::{DISCHARGE_CHAIN, DischargeOutcome, discharge_chain, reconcile_station};
pub use weather::{reconcile_alerts, reconcile_weather};
