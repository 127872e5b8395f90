/// Per-station provider fallback.
///
/// Discharge comes from the first provider in `DISCHARGE_CHAIN` that returns
/// a non-empty discharge series. An accepted result missing water
/// temperature is supplemented from NWRFC. The NWPS forecast is fetched on
/// its own thread alongside the chain and attached regardless of the
/// discharge outcome. Every step is best-effort: failures are logged and
/// the station simply ends up with less data.

use chrono::Utc;
use std::thread;

use crate::ingest::StationSources;
use crate::logging::{self, DataSource};
use crate::model::{FetchError, Provider, Sample, SeriesSet, StationReading};
use crate::stations::Station;

/// Discharge providers in priority order.
pub const DISCHARGE_CHAIN: [Provider; 2] = [Provider::Usgs, Provider::Usbr];

/// Outcome of the discharge chain.
#[derive(Debug, Clone, PartialEq)]
pub enum DischargeOutcome {
    Accepted { source: Provider, series: SeriesSet },
    NoData,
}

/// Builds a fresh reading for `station`. Never fails; a station whose
/// providers all fail yields an empty reading with no source.
pub fn reconcile_station(sources: &dyn StationSources, station: &Station) -> StationReading {
    thread::scope(|scope| {
        let forecast_job = station
            .identifier(Provider::Nwps)
            .map(|lid| scope.spawn(move || fetch_forecast(sources, &station.id, lid)));

        let mut reading = StationReading::default();
        match discharge_chain(sources, station) {
            DischargeOutcome::Accepted { source, mut series } => {
                supplement_temperature(sources, station, &mut series);
                reading.series = series;
                reading.source = Some(source);
            }
            DischargeOutcome::NoData => {
                logging::warn(DataSource::System, Some(&station.id), "no discharge from any provider");
            }
        }

        if let Some(job) = forecast_job {
            reading.series.forecast = job.join().unwrap_or_else(|_| {
                logging::error(DataSource::Nwps, Some(&station.id), "forecast fetch panicked");
                Vec::new()
            });
        }

        reading.fetched_at = Some(Utc::now());
        reading
    })
}

/// Tries each provider in `DISCHARGE_CHAIN` the station has an identifier
/// for, stopping at the first with discharge data.
pub fn discharge_chain(sources: &dyn StationSources, station: &Station) -> DischargeOutcome {
    DISCHARGE_CHAIN
        .iter()
        .find_map(|&provider| {
            try_discharge(sources, station, provider).map(|series| DischargeOutcome::Accepted {
                source: provider,
                series,
            })
        })
        .unwrap_or(DischargeOutcome::NoData)
}

fn try_discharge(
    sources: &dyn StationSources,
    station: &Station,
    provider: Provider,
) -> Option<SeriesSet> {
    let id = station.identifier(provider)?;
    let result = match provider {
        Provider::Usgs => sources.primary(id),
        Provider::Usbr => sources.secondary(id),
        _ => return None,
    };

    match result {
        Ok(series) if !series.discharge.is_empty() => {
            logging::debug(
                provider.into(),
                Some(&station.id),
                &format!("{} discharge samples from {}", series.discharge.len(), id),
            );
            Some(series)
        }
        Ok(_) => {
            logging::info(provider.into(), Some(&station.id), &format!("no discharge data for {}", id));
            None
        }
        Err(e) => {
            logging::log_fetch_failure(&format!("{} discharge fetch", provider), &e);
            None
        }
    }
}

/// Replaces an empty water-temperature series with NWRFC data.
fn supplement_temperature(sources: &dyn StationSources, station: &Station, series: &mut SeriesSet) {
    if !series.water_temp.is_empty() {
        return;
    }
    let Some(code) = station.identifier(Provider::Nwrfc) else {
        return;
    };
    match sources.supplemental_temperature(code) {
        Ok(samples) => {
            logging::debug(
                DataSource::Nwrfc,
                Some(&station.id),
                &format!("{} supplemental temperature samples", samples.len()),
            );
            series.water_temp = samples;
        }
        Err(e) => logging::log_fetch_failure("NWRFC temperature fetch", &e),
    }
}

fn fetch_forecast(sources: &dyn StationSources, station_id: &str, lid: &str) -> Vec<Sample> {
    sources.forecast_flow(lid).unwrap_or_else(|e: FetchError| {
        logging::log_fetch_failure("NWPS forecast fetch", &e);
        logging::debug(DataSource::Nwps, Some(station_id), "continuing without forecast");
        Vec::new()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
