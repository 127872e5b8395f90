/// Shared HTTP plumbing for every provider client.
///
/// All outbound requests go through one blocking `reqwest` client. Each call
/// sets its own timeout; when it elapses the client aborts the in-flight
/// request and the call returns `FetchError::Timeout`. Nothing outlives the
/// call, so there is no timer to clear on either path.

use std::time::Duration;

use crate::model::{FetchError, Provider};

/// Sent with every request; NWS and USBR reject anonymous clients.
pub const USER_AGENT: &str = "YakimaBasinDashboard/1.0 (yakmon_service)";

/// Builds the shared client.
pub fn build_client() -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
}

/// GETs `url` and returns the body as text.
pub fn get_text(
    client: &reqwest::blocking::Client,
    url: &str,
    timeout: Duration,
    provider: Provider,
    id: &str,
) -> Result<String, FetchError> {
    let request = client.get(url).timeout(timeout);
    send(request, provider, id)
}

/// POSTs a JSON body to `url` and returns the response body as text.
pub fn post_json_text(
    client: &reqwest::blocking::Client,
    url: &str,
    body: &serde_json::Value,
    timeout: Duration,
    provider: Provider,
    id: &str,
) -> Result<String, FetchError> {
    let request = client.post(url).json(body).timeout(timeout);
    send(request, provider, id)
}

fn send(
    request: reqwest::blocking::RequestBuilder,
    provider: Provider,
    id: &str,
) -> Result<String, FetchError> {
    let response = request.send().map_err(|e| map_error(e, provider, id))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpError {
            provider,
            id: id.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(|e| map_error(e, provider, id))
}

fn map_error(err: reqwest::Error, provider: Provider, id: &str) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout { provider, id: id.to_string() }
    } else if let Some(status) = err.status() {
        FetchError::HttpError { provider, id: id.to_string(), status: status.as_u16() }
    } else {
        FetchError::Transport { provider, id: id.to_string(), message: err.to_string() }
    }
}

/// Prefixes `path` with the proxy base when one is configured, otherwise
/// returns `direct`.
pub fn route_url(proxy_base: Option<&str>, proxy_path: &str, direct: &str) -> String {
    match proxy_base {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), proxy_path),
        None => direct.to_string(),
    }
}
