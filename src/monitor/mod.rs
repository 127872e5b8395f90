/// In-memory dashboard state and health aggregation.
///
/// ## Snapshot policy
///
/// Each station and weather location owns one slot holding an
/// `Arc` to an immutable reading. A refresh never edits a reading in place:
/// it builds a new one and swaps the `Arc` into the slot, discarding the old
/// value even when the new one is empty. Readers clone the `Arc` and are
/// never blocked by a refresh for longer than the swap.
///
/// ## Presentation
///
/// Reconciliation tasks report through `ReadingSink` as soon as they finish,
/// without waiting for siblings. `DashboardState` is the sink the daemon and
/// the HTTP endpoint share.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::analysis::series::{latest, trend_at};
use crate::model::{Alert, HealthStatus, Provider, StationReading, Trend, WeatherReading};
use crate::stations::Station;

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Receives each task's result the moment it settles.
pub trait ReadingSink: Send + Sync {
    fn station_updated(&self, station_id: &str, reading: StationReading);
    fn weather_updated(&self, location_id: &str, reading: WeatherReading);
    fn alerts_updated(&self, alerts: Vec<Alert>);
    /// Called once per cycle after every task has settled.
    fn cycle_completed(&self, _summary: &RefreshSummary) {}
}

// ---------------------------------------------------------------------------
// Refresh summary
// ---------------------------------------------------------------------------

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    /// Stations whose reading has discharge data.
    pub loaded: usize,
    /// Stations configured.
    pub total: usize,
    pub status: HealthStatus,
    /// Jobs that settled normally (stations, weather locations, alerts).
    pub completed_tasks: usize,
    /// Jobs that panicked or never reported back.
    pub failed_tasks: usize,
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Station cards
// ---------------------------------------------------------------------------

/// Metric-card view of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCard {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: String,
    pub source: Option<Provider>,
    pub discharge_cfs: Option<f64>,
    pub discharge_trend: Trend,
    pub water_temp_f: Option<f64>,
    pub gage_height_ft: Option<f64>,
    pub forecast_points: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StationCard {
    pub fn build_at(station: &Station, reading: Option<&StationReading>, now: DateTime<Utc>) -> Self {
        let empty = StationReading::default();
        let reading = reading.unwrap_or(&empty);
        let series = &reading.series;
        StationCard {
            id: station.id.clone(),
            name: station.name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            color: station.color.clone(),
            source: reading.source,
            discharge_cfs: latest(&series.discharge).map(|s| s.value),
            discharge_trend: trend_at(&series.discharge, now),
            water_temp_f: latest(&series.water_temp).map(|s| s.value),
            gage_height_ft: latest(&series.gage_height).map(|s| s.value),
            forecast_points: series.forecast.len(),
            fetched_at: reading.fetched_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot store
// ---------------------------------------------------------------------------

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Latest reading per station and location, current alerts, and the last
/// cycle's summary.
#[derive(Default)]
pub struct DashboardState {
    stations: RwLock<HashMap<String, Arc<StationReading>>>,
    weather: RwLock<HashMap<String, Arc<WeatherReading>>>,
    alerts: RwLock<Arc<Vec<Alert>>>,
    last_summary: RwLock<Option<RefreshSummary>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn station(&self, id: &str) -> Option<Arc<StationReading>> {
        read(&self.stations).get(id).cloned()
    }

    pub fn weather(&self, id: &str) -> Option<Arc<WeatherReading>> {
        read(&self.weather).get(id).cloned()
    }

    pub fn alerts(&self) -> Arc<Vec<Alert>> {
        read(&self.alerts).clone()
    }

    pub fn last_summary(&self) -> Option<RefreshSummary> {
        read(&self.last_summary).clone()
    }

    /// Counts the configured stations whose current reading has discharge.
    pub fn loaded_count(&self, stations: &[Station]) -> usize {
        let readings = read(&self.stations);
        stations
            .iter()
            .filter(|s| readings.get(&s.id).is_some_and(|r| r.has_discharge()))
            .count()
    }

    /// Health indicator over the configured stations.
    pub fn health(&self, stations: &[Station]) -> HealthStatus {
        HealthStatus::from_counts(self.loaded_count(stations), stations.len())
    }

    pub fn station_cards_at(&self, stations: &[Station], now: DateTime<Utc>) -> Vec<StationCard> {
        let readings = read(&self.stations);
        stations
            .iter()
            .map(|s| StationCard::build_at(s, readings.get(&s.id).map(|r| r.as_ref()), now))
            .collect()
    }
}

impl ReadingSink for DashboardState {
    fn station_updated(&self, station_id: &str, reading: StationReading) {
        write(&self.stations).insert(station_id.to_string(), Arc::new(reading));
    }

    fn weather_updated(&self, location_id: &str, reading: WeatherReading) {
        write(&self.weather).insert(location_id.to_string(), Arc::new(reading));
    }

    fn alerts_updated(&self, alerts: Vec<Alert>) {
        *write(&self.alerts) = Arc::new(alerts);
    }

    fn cycle_completed(&self, summary: &RefreshSummary) {
        *write(&self.last_summary) = Some(summary.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sample, SeriesSet};
    use crate::stations::test_station;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap()
    }

    fn reading_with_discharge(values: &[(i64, f64)]) -> StationReading {
        StationReading {
            series: SeriesSet {
                discharge: values
                    .iter()
                    .map(|&(h, v)| Sample { time: now() - Duration::hours(h), value: v })
                    .collect(),
                ..SeriesSet::default()
            },
            source: Some(Provider::Usgs),
            fetched_at: Some(now()),
        }
    }

    #[test]
    fn test_new_reading_replaces_previous_even_when_empty() {
        let state = DashboardState::new();
        state.station_updated("parker", reading_with_discharge(&[(0, 1200.0)]));
        let before = state.station("parker").unwrap();

        state.station_updated("parker", StationReading::default());
        let after = state.station("parker").unwrap();

        assert!(before.has_discharge(), "earlier snapshot is untouched");
        assert!(!after.has_discharge());
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_health_levels() {
        let stations = vec![test_station("a"), test_station("b"), test_station("c")];
        let state = DashboardState::new();
        assert_eq!(state.health(&stations), HealthStatus::NoneLoaded);

        state.station_updated("a", reading_with_discharge(&[(0, 100.0)]));
        state.station_updated("b", reading_with_discharge(&[(0, 200.0)]));
        state.station_updated("c", StationReading::default());
        assert_eq!(state.loaded_count(&stations), 2);
        assert_eq!(state.health(&stations), HealthStatus::Partial);

        state.station_updated("c", reading_with_discharge(&[(0, 300.0)]));
        assert_eq!(state.health(&stations), HealthStatus::AllLoaded);
    }

    #[test]
    fn test_readings_for_unconfigured_ids_do_not_count() {
        let stations = vec![test_station("a")];
        let state = DashboardState::new();
        state.station_updated("retired", reading_with_discharge(&[(0, 100.0)]));
        assert_eq!(state.loaded_count(&stations), 0);
    }

    #[test]
    fn test_station_card_latest_and_trend() {
        let station = test_station("umtanum");
        let reading = reading_with_discharge(&[(30, 1000.0), (0, 1250.0)]);
        let card = StationCard::build_at(&station, Some(&reading), now());
        assert_eq!(card.discharge_cfs, Some(1250.0));
        assert_eq!(card.discharge_trend, Trend::Rising);
        assert_eq!(card.source, Some(Provider::Usgs));
        assert_eq!(card.water_temp_f, None);
    }

    #[test]
    fn test_station_card_without_reading_is_no_data() {
        let card = StationCard::build_at(&test_station("kiona"), None, now());
        assert_eq!(card.source, None);
        assert_eq!(card.discharge_cfs, None);
        assert_eq!(card.discharge_trend, Trend::Stable);
    }

    #[test]
    fn test_alerts_and_weather_slots() {
        let state = DashboardState::new();
        assert!(state.alerts().is_empty());
        state.alerts_updated(vec![Alert { event: "Flood Watch".into(), headline: "Flood Watch".into() }]);
        assert_eq!(state.alerts().len(), 1);

        assert!(state.weather("yakima").is_none());
        state.weather_updated("yakima", WeatherReading::default());
        assert!(!state.weather("yakima").unwrap().has_data());
    }
}
