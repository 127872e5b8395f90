/// HTTP endpoint for the dashboard front end
///
/// Serves the current snapshot as JSON and proxies the two providers that
/// do not send CORS headers.
///
/// Endpoints:
/// - GET  /health                          - Aggregate health and last refresh
/// - GET  /stations                        - Metric cards for every station
/// - GET  /stations/{id}/chart?max_points= - Chart series for one station
/// - GET  /weather                         - Weather reading per location
/// - GET  /alerts                          - Active basin hazard alerts
/// - POST /refresh                         - Start a refresh cycle
/// - POST /visibility?visible=true|false   - Pause or resume auto-refresh
/// - GET  /api/usbr?...                    - USBR instant.pl proxy
/// - GET  /api/nwrfc?...                   - NWRFC textPlot proxy

use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::series::chart_view;
use crate::daemon::Daemon;
use crate::ingest::{nwrfc, usbr};
use crate::logging::{self, DataSource};
use crate::model::StationReading;
use crate::monitor::DashboardState;
use crate::stations::find_station;

/// Upstream timeout for proxied requests.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A routed response, before it is turned into a `tiny_http::Response`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    /// Adds `Access-Control-Allow-Origin: *`.
    pub cors: bool,
}

impl Reply {
    fn json(status: u16, value: serde_json::Value) -> Self {
        let body = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
        Reply {
            status,
            content_type: "application/json".to_string(),
            body: body.into_bytes(),
            cors: true,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Reply::json(status, json!({ "error": message }))
    }

    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Splits `/path?a=1&b=2` into the path and its decoded query pairs.
pub fn split_url(url: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(&s.replace('+', " "))
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            };
            (decode(k), decode(v))
        })
        .collect();
    (path, params)
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

pub struct Endpoint {
    daemon: Arc<Daemon>,
    state: Arc<DashboardState>,
    client: reqwest::blocking::Client,
}

impl Endpoint {
    pub fn new(daemon: Arc<Daemon>, state: Arc<DashboardState>, client: reqwest::blocking::Client) -> Self {
        Self { daemon, state, client }
    }

    /// Routes one request. `url` is the request target including any query.
    pub fn handle(&self, method: &tiny_http::Method, url: &str) -> Reply {
        use tiny_http::Method::{Get, Post};

        let (path, params) = split_url(url);
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            (Get, ["health"]) => self.health(),
            (Get, ["stations"]) => self.stations(),
            (Get, ["stations", id, "chart"]) => self.chart(id, params.get("max_points")),
            (Get, ["weather"]) => self.weather(),
            (Get, ["alerts"]) => {
                let alerts = self.state.alerts();
                Reply::json(200, json!({ "alerts": alerts.as_slice() }))
            }
            (Post, ["refresh"]) => self.refresh(),
            (Post, ["visibility"]) => self.visibility(params.get("visible")),
            (Get, ["api", "usbr"]) => self.proxy(usbr::USBR_BASE_URL, url),
            (Get, ["api", "nwrfc"]) => self.proxy(nwrfc::NWRFC_BASE_URL, url),
            (_, ["health" | "stations" | "weather" | "alerts" | "refresh" | "visibility"])
            | (_, ["stations", _, "chart"])
            | (_, ["api", "usbr" | "nwrfc"]) => Reply::error(405, "method not allowed"),
            _ => Reply::json(
                404,
                json!({
                    "error": "Not found",
                    "available_endpoints": [
                        "/health", "/stations", "/stations/{id}/chart", "/weather", "/alerts",
                        "/refresh", "/visibility", "/api/usbr", "/api/nwrfc"
                    ]
                }),
            ),
        }
    }

    fn health(&self) -> Reply {
        let stations = &self.daemon.config().stations;
        let loaded = self.state.loaded_count(stations);
        Reply::json(
            200,
            json!({
                "service": "yakmon_service",
                "version": env!("CARGO_PKG_VERSION"),
                "status": self.state.health(stations),
                "loaded": loaded,
                "total": stations.len(),
                "refreshing": self.daemon.is_refreshing(),
                "visible": self.daemon.is_visible(),
                "last_refresh": self.state.last_summary(),
            }),
        )
    }

    fn stations(&self) -> Reply {
        let cards = self.state.station_cards_at(&self.daemon.config().stations, Utc::now());
        Reply::json(200, json!({ "stations": cards }))
    }

    fn chart(&self, id: &str, max_points: Option<&String>) -> Reply {
        let config = self.daemon.config();
        if find_station(&config.stations, id).is_none() {
            return Reply::error(404, &format!("unknown station '{}'", id));
        }
        let max_points = match max_points {
            None => config.refresh.chart_max_points,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Reply::error(400, "max_points must be a positive integer"),
            },
        };

        let reading = self
            .state
            .station(id)
            .unwrap_or_else(|| Arc::new(StationReading::default()));
        let view = chart_view(&reading, max_points);
        Reply::json(200, json!({ "id": id, "source": reading.source, "chart": view }))
    }

    fn weather(&self) -> Reply {
        let locations: Vec<serde_json::Value> = self
            .daemon
            .config()
            .weather_locations
            .iter()
            .map(|loc| {
                json!({
                    "id": loc.id,
                    "name": loc.name,
                    "reading": self.state.weather(&loc.id).map(|r| (*r).clone()),
                })
            })
            .collect();
        Reply::json(200, json!({ "locations": locations }))
    }

    fn refresh(&self) -> Reply {
        if self.daemon.spawn_refresh() {
            Reply::json(202, json!({ "status": "started" }))
        } else {
            Reply::json(409, json!({ "status": "already_refreshing" }))
        }
    }

    fn visibility(&self, visible: Option<&String>) -> Reply {
        match visible.map(|v| v.as_str()) {
            Some("true") => self.daemon.set_visible(true),
            Some("false") => self.daemon.set_visible(false),
            _ => return Reply::error(400, "visible must be true or false"),
        }
        Reply::json(200, json!({ "visible": self.daemon.is_visible() }))
    }

    /// Forwards the query string to `upstream` and relays the body with a
    /// permissive CORS header. Upstream HTTP errors keep their status;
    /// anything else is a 502.
    fn proxy(&self, upstream: &str, url: &str) -> Reply {
        let target = match url.split_once('?') {
            Some((_, query)) if !query.is_empty() => format!("{}?{}", upstream, query),
            _ => upstream.to_string(),
        };

        let result = self
            .client
            .get(&target)
            .timeout(PROXY_TIMEOUT)
            .send()
            .and_then(|response| response.error_for_status());

        match result {
            Ok(response) => {
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("text/plain")
                    .to_string();
                match response.bytes() {
                    Ok(body) => Reply { status: 200, content_type, body: body.to_vec(), cors: true },
                    Err(e) => proxy_failure(&target, 502, &e.to_string()),
                }
            }
            Err(e) => match e.status() {
                Some(status) => proxy_failure(&target, status.as_u16(), "upstream error"),
                None => proxy_failure(&target, 502, &e.to_string()),
            },
        }
    }
}

fn proxy_failure(target: &str, status: u16, message: &str) -> Reply {
    logging::warn(DataSource::System, None, &format!("proxy {} -> {}: {}", target, status, message));
    Reply::error(status, &format!("Proxy error: {}", message))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<tiny_http::Header> {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

/// Create HTTP response from a routed reply
fn create_response(reply: Reply) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let mut response = tiny_http::Response::from_data(reply.body)
        .with_status_code(tiny_http::StatusCode::from(reply.status));
    if let Some(h) = header("Content-Type", &reply.content_type) {
        response.add_header(h);
    }
    if reply.cors {
        if let Some(h) = header("Access-Control-Allow-Origin", "*") {
            response.add_header(h);
        }
    }
    response
}

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(port: u16, endpoint: Endpoint) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    logging::info(
        DataSource::System,
        None,
        &format!("HTTP endpoint listening on http://0.0.0.0:{}", port),
    );

    for request in server.incoming_requests() {
        let reply = endpoint.handle(request.method(), request.url());
        logging::debug(
            DataSource::System,
            None,
            &format!("{} {} -> {}", request.method(), request.url(), reply.status),
        );
        if let Err(e) = request.respond(create_response(reply)) {
            logging::warn(DataSource::System, None, &format!("Failed to send response: {}", e));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
