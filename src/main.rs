//! Yakima Basin Dashboard Service - Main Daemon
//!
//! A server-side daemon that:
//! 1. Polls USGS, USBR, NWRFC, NWPS, weather and NWS alert feeds
//! 2. Reconciles each station across providers with fallback
//! 3. Keeps the latest snapshot per station and weather location in memory
//! 4. Serves the snapshot (and a CORS proxy) over HTTP
//!
//! Usage:
//!   cargo run --release                          # Refresh loop without HTTP endpoint
//!   cargo run --release -- --endpoint 8080       # With HTTP endpoint on port 8080
//!   cargo run --release -- --once                # One cycle, print summary, exit
//!   cargo run --release -- --config other.toml --log-file yakmon.log --verbose

use std::env;
use std::process;
use std::sync::Arc;

use yakmon_service::config::{self, DEFAULT_CONFIG_PATH};
use yakmon_service::daemon::Daemon;
use yakmon_service::endpoint::{self, Endpoint};
use yakmon_service::ingest::http::build_client;
use yakmon_service::ingest::sources::HttpSources;
use yakmon_service::logging::{self, DataSource, LogLevel};
use yakmon_service::model::HealthStatus;
use yakmon_service::monitor::DashboardState;

struct Args {
    config_path: String,
    endpoint_port: Option<u16>,
    once: bool,
    log_file: Option<String>,
    verbose: bool,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [--config PATH] [--endpoint PORT] [--once] [--log-file PATH] [--verbose]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        endpoint_port: None,
        once: false,
        log_file: None,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                parsed.config_path = args.get(i + 1).ok_or("--config requires a path")?.clone();
                i += 2;
            }
            "--endpoint" => {
                let port = args.get(i + 1).ok_or("--endpoint requires a port number")?;
                parsed.endpoint_port =
                    Some(port.parse().map_err(|_| format!("invalid port '{}'", port))?);
                i += 2;
            }
            "--log-file" => {
                parsed.log_file = Some(args.get(i + 1).ok_or("--log-file requires a path")?.clone());
                i += 2;
            }
            "--once" => {
                parsed.once = true;
                i += 1;
            }
            "--verbose" => {
                parsed.verbose = true;
                i += 1;
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

fn main() {
    let raw: Vec<String> = env::args().collect();
    let program = raw.first().map(String::as_str).unwrap_or("yakmon_service");
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", usage(program));
            process::exit(1);
        }
    };

    let level = if args.verbose { LogLevel::Debug } else { LogLevel::Info };
    logging::init_logger(level, args.log_file.as_deref(), true);

    println!("🌊 Yakima Basin Dashboard Service");
    println!("=================================\n");

    let config = match config::load_config_from(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            process::exit(1);
        }
    };
    logging::info(
        DataSource::System,
        None,
        &format!(
            "Loaded {}: {} stations, {} weather locations",
            args.config_path,
            config.stations.len(),
            config.weather_locations.len()
        ),
    );

    let sources = match HttpSources::new(config.clone()) {
        Ok(sources) => Arc::new(sources),
        Err(e) => {
            eprintln!("❌ Failed to build HTTP client: {}", e);
            process::exit(1);
        }
    };
    let state = Arc::new(DashboardState::new());
    let daemon = Arc::new(Daemon::new(config, sources.clone(), sources, state.clone()));

    if args.once {
        let Some(summary) = daemon.refresh() else {
            process::exit(1);
        };
        println!(
            "{}/{} stations loaded ({:?}), {} tasks completed, {} failed",
            summary.loaded, summary.total, summary.status, summary.completed_tasks, summary.failed_tasks
        );
        let code = if summary.status == HealthStatus::NoneLoaded { 1 } else { 0 };
        process::exit(code);
    }

    if let Some(port) = args.endpoint_port {
        match build_client() {
            Ok(client) => {
                let endpoint = Endpoint::new(daemon.clone(), state.clone(), client);
                std::thread::spawn(move || {
                    if let Err(e) = endpoint::start_endpoint_server(port, endpoint) {
                        logging::error(DataSource::System, None, &format!("Endpoint server error: {}", e));
                    }
                });
                println!("   Endpoint running on http://0.0.0.0:{}\n", port);
            }
            Err(e) => {
                eprintln!("❌ Failed to build proxy client: {}", e);
                eprintln!("   Continuing without HTTP endpoint\n");
            }
        }
    }

    println!("🔄 Starting refresh loop (Ctrl+C to stop)\n");
    if let Err(e) = daemon.run() {
        eprintln!("\n❌ Daemon error: {}", e);
        process::exit(1);
    }
}
