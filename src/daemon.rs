/// Refresh-cycle daemon for the basin dashboard.
///
/// A cycle fans out one job per station, one per weather location and one
/// for alerts onto a thread pool. Each job hands its reading to the sink as
/// soon as it settles, so one slow provider never holds up the others. The
/// caller joins on a channel until every job has reported (or died), then
/// computes the health summary.
///
/// Only one cycle runs at a time. The in-flight flag is taken with a
/// compare-and-swap and released by a guard's `Drop`, so it is cleared on
/// every exit path including a panic inside the cycle.

use chrono::Utc;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};
use threadpool::ThreadPool;

use crate::config::DashboardConfig;
use crate::ingest::{StationSources, WeatherSources};
use crate::logging::{self, DataSource};
use crate::model::{HealthStatus, StationReading, WeatherReading};
use crate::monitor::{ReadingSink, RefreshSummary};
use crate::reconcile::{reconcile_alerts, reconcile_station, reconcile_weather};

/// How often `run` wakes to check whether a tick is due.
const TICK_CHECK_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

/// Holds the in-flight flag for the duration of one cycle.
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RefreshGuard<'a> {
    /// Returns `None` if a cycle already holds the flag.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard { flag })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Job outcomes
// ---------------------------------------------------------------------------

enum JobOutcome {
    Station { loaded: bool },
    Weather,
    Alerts,
    Failed { task: String },
}

// ---------------------------------------------------------------------------
// Daemon
// ---------------------------------------------------------------------------

pub struct Daemon {
    config: DashboardConfig,
    station_sources: Arc<dyn StationSources>,
    weather_sources: Arc<dyn WeatherSources>,
    sink: Arc<dyn ReadingSink>,
    refreshing: AtomicBool,
    visible: AtomicBool,
}

impl Daemon {
    pub fn new(
        config: DashboardConfig,
        station_sources: Arc<dyn StationSources>,
        weather_sources: Arc<dyn WeatherSources>,
        sink: Arc<dyn ReadingSink>,
    ) -> Self {
        Self {
            config,
            station_sources,
            weather_sources,
            sink,
            refreshing: AtomicBool::new(false),
            visible: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Auto-refresh only runs while the dashboard is being viewed.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
        logging::debug(
            DataSource::System,
            None,
            if visible { "dashboard visible" } else { "dashboard hidden; auto-refresh paused" },
        );
    }

    /// Runs one full cycle and returns its summary, or `None` without doing
    /// anything when a cycle is already in flight.
    pub fn refresh(&self) -> Option<RefreshSummary> {
        let Some(_guard) = RefreshGuard::acquire(&self.refreshing) else {
            logging::debug(DataSource::System, None, "refresh already in flight; skipping");
            return None;
        };
        Some(self.refresh_held())
    }

    /// Starts a cycle on a background thread. Returns `false` without
    /// starting anything when a cycle is already in flight.
    pub fn spawn_refresh(self: &Arc<Self>) -> bool {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let daemon = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("refresh".to_string())
            .spawn(move || {
                let _guard = RefreshGuard { flag: &daemon.refreshing };
                daemon.refresh_held();
            });

        if let Err(e) = spawned {
            self.refreshing.store(false, Ordering::Release);
            logging::error(DataSource::System, None, &format!("could not start refresh thread: {}", e));
            return false;
        }
        true
    }

    /// Body of a cycle; the caller holds the in-flight flag.
    fn refresh_held(&self) -> RefreshSummary {
        let total = self.config.stations.len();
        let summary = match panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle())) {
            Ok(summary) => summary,
            Err(_) => {
                logging::error(DataSource::System, None, "refresh cycle aborted unexpectedly");
                RefreshSummary {
                    loaded: 0,
                    total,
                    status: HealthStatus::NoneLoaded,
                    completed_tasks: 0,
                    failed_tasks: self.task_count(),
                    finished_at: Utc::now(),
                }
            }
        };

        logging::log_refresh_summary(summary.loaded, summary.total, summary.failed_tasks, summary.status);
        self.sink.cycle_completed(&summary);
        summary
    }

    /// Scheduled refresh: skipped while hidden or while a cycle is in flight.
    pub fn auto_refresh_tick(&self) -> Option<RefreshSummary> {
        if !self.is_visible() {
            logging::debug(DataSource::System, None, "auto-refresh skipped: not visible");
            return None;
        }
        if self.is_refreshing() {
            logging::debug(DataSource::System, None, "auto-refresh skipped: refresh in flight");
            return None;
        }
        self.refresh()
    }

    /// Refreshes immediately, then on every interval, forever.
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        let interval = self.config.refresh_interval();
        if interval.is_zero() {
            return Err("refresh interval must be positive".into());
        }

        logging::info(
            DataSource::System,
            None,
            &format!(
                "Starting refresh loop: {} stations, {} weather locations, every {} min",
                self.config.stations.len(),
                self.config.weather_locations.len(),
                interval.as_secs() / 60
            ),
        );

        self.refresh();
        let mut next_tick = Instant::now() + interval;
        loop {
            thread::sleep(TICK_CHECK_INTERVAL);
            if Instant::now() < next_tick {
                continue;
            }
            next_tick = Instant::now() + interval;
            self.auto_refresh_tick();
        }
    }

    fn task_count(&self) -> usize {
        self.config.stations.len() + self.config.weather_locations.len() + 1
    }

    fn run_cycle(&self) -> RefreshSummary {
        let task_count = self.task_count();
        // One worker per task so a stalled provider never queues its siblings.
        let pool = ThreadPool::new(task_count);
        let (tx, rx) = mpsc::channel::<JobOutcome>();

        for station in self.config.stations.iter().cloned() {
            let tx = tx.clone();
            let sources = Arc::clone(&self.station_sources);
            let sink = Arc::clone(&self.sink);
            pool.execute(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let reading = reconcile_station(sources.as_ref(), &station);
                    let loaded = reading.has_discharge();
                    sink.station_updated(&station.id, reading);
                    loaded
                }));
                let outcome = match outcome {
                    Ok(loaded) => JobOutcome::Station { loaded },
                    Err(_) => {
                        sink.station_updated(&station.id, StationReading::default());
                        JobOutcome::Failed { task: format!("station {}", station.id) }
                    }
                };
                let _ = tx.send(outcome);
            });
        }

        for location in self.config.weather_locations.iter().cloned() {
            let tx = tx.clone();
            let sources = Arc::clone(&self.weather_sources);
            let sink = Arc::clone(&self.sink);
            pool.execute(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let reading = reconcile_weather(sources.as_ref(), &location);
                    sink.weather_updated(&location.id, reading);
                }));
                let outcome = match outcome {
                    Ok(()) => JobOutcome::Weather,
                    Err(_) => {
                        sink.weather_updated(&location.id, WeatherReading::default());
                        JobOutcome::Failed { task: format!("weather {}", location.id) }
                    }
                };
                let _ = tx.send(outcome);
            });
        }

        {
            let tx = tx.clone();
            let sources = Arc::clone(&self.weather_sources);
            let sink = Arc::clone(&self.sink);
            pool.execute(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    sink.alerts_updated(reconcile_alerts(sources.as_ref()));
                }));
                let outcome = match outcome {
                    Ok(()) => JobOutcome::Alerts,
                    Err(_) => JobOutcome::Failed { task: "alerts".to_string() },
                };
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut loaded = 0;
        let mut completed = 0;
        for outcome in rx.iter() {
            match outcome {
                JobOutcome::Station { loaded: true } => {
                    loaded += 1;
                    completed += 1;
                }
                JobOutcome::Station { loaded: false } | JobOutcome::Weather | JobOutcome::Alerts => {
                    completed += 1;
                }
                JobOutcome::Failed { task } => {
                    logging::error(DataSource::System, None, &format!("{} task panicked", task));
                }
            }
        }

        let total = self.config.stations.len();
        RefreshSummary {
            loaded,
            total,
            status: HealthStatus::from_counts(loaded, total),
            completed_tasks: completed,
            failed_tasks: task_count - completed,
            finished_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
