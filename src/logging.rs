/// Structured logging for the basin dashboard service
///
/// Provides context-rich logging with station/location identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for daemon operations.

use crate::model::{FetchError, HealthStatus, Provider};
use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Usgs,
    Usbr,
    Nwrfc,
    Nwps,
    Weather,
    Alerts,
    System,
}

impl From<Provider> for DataSource {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Usgs => DataSource::Usgs,
            Provider::Usbr => DataSource::Usbr,
            Provider::Nwrfc => DataSource::Nwrfc,
            Provider::Nwps => DataSource::Nwps,
            Provider::Weather => DataSource::Weather,
            Provider::Alerts => DataSource::Alerts,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Usgs => write!(f, "USGS"),
            DataSource::Usbr => write!(f, "USBR"),
            DataSource::Nwrfc => write!(f, "NWRFC"),
            DataSource::Nwps => write!(f, "NWPS"),
            DataSource::Weather => write!(f, "WX"),
            DataSource::Alerts => write!(f, "ALERTS"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - gauge not reporting, seasonal, or unknown to provider
    Expected,
    /// Unexpected failure - provider outage or format change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a provider failure.
///
/// 404s mean the identifier isn't served by that provider, which happens
/// routinely with seasonal gauges. Server errors and unreadable bodies point
/// at the provider. Timeouts and connection failures could be either.
pub fn classify_failure(err: &FetchError) -> FailureType {
    match err {
        FetchError::HttpError { status, .. } if *status == 404 => FailureType::Expected,
        FetchError::HttpError { status, .. } if *status >= 500 => FailureType::Unexpected,
        FetchError::HttpError { .. } => FailureType::Unknown,
        FetchError::ParseError { .. } => FailureType::Unexpected,
        FetchError::Timeout { .. } | FetchError::Transport { .. } => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: DataSource, id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let id_part = id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format_entry(&timestamp.to_string(), level, source, id, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, id_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, id_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", source, id_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// One log line: `<timestamp> <LEVEL> <SOURCE> [id]: message`
fn format_entry(
    timestamp: &str,
    level: LogLevel,
    source: DataSource,
    id: Option<&str>,
    message: &str,
) -> String {
    let id_part = id.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, source, id_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, source: DataSource, id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, source, id, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, id: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, id, message);
}

/// Log a warning message
pub fn warn(source: DataSource, id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, id, message);
}

/// Log an error message
pub fn error(source: DataSource, id: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, id, message);
}

/// Log a debug message
pub fn debug(source: DataSource, id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, id, message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a provider failure with automatic classification
pub fn log_fetch_failure(operation: &str, err: &FetchError) {
    let failure_type = classify_failure(err);
    let source = DataSource::from(err.provider());
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(err.id()), &message),
        FailureType::Unexpected => error(source, Some(err.id()), &message),
        FailureType::Unknown => warn(source, Some(err.id()), &message),
    }
}

// ---------------------------------------------------------------------------
// Refresh Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of one refresh cycle
pub fn log_refresh_summary(loaded: usize, total: usize, failed_tasks: usize, status: HealthStatus) {
    let message = format!(
        "Refresh complete: {}/{} stations with discharge, {} failed tasks ({:?})",
        loaded, total, failed_tasks, status
    );

    match status {
        HealthStatus::AllLoaded => info(DataSource::System, None, &message),
        HealthStatus::Partial => warn(DataSource::System, None, &message),
        HealthStatus::NoneLoaded => error(DataSource::System, None, &message),
    }
}
