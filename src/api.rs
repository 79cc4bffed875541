//! Order backend API plumbing.
//!
//! Provides base-URL normalization, the shared JSON request helper, and
//! the error taxonomy every endpoint wrapper maps into. Transport
//! failures and non-2xx statuses both surface as [`ApiError`]; callers
//! that can degrade to the offline cache treat any variant as a trigger.

use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by the backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, DNS).
    #[error("{0}")]
    Network(String),
    /// The backend answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
    /// The response body was not the JSON we expected.
    #[error("Invalid JSON from order backend: {0}")]
    InvalidJson(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the backend base URL:
/// - strip trailing slashes
/// - strip a trailing `/api` segment
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    // Ensure scheme
    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    // Strip trailing slashes
    while url.ends_with('/') {
        url.pop();
    }

    // Strip trailing /api
    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }

    // Strip trailing slashes again (in case "/api/" was present)
    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> ApiError {
    if err.is_connect() {
        return ApiError::Network(format!("Cannot reach order backend at {url}"));
    }
    if err.is_timeout() {
        return ApiError::Network(format!("Connection to {url} timed out"));
    }
    if err.is_builder() {
        return ApiError::Network(format!("Invalid order backend URL: {url}"));
    }
    ApiError::Network(format!("Network error communicating with {url}: {err}"))
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Login is invalid or the session expired".to_string(),
        403 => "Not authorized for this operation".to_string(),
        404 => "Order backend endpoint not found".to_string(),
        s if s >= 500 => format!("Order backend server error (HTTP {s})"),
        s => format!("Unexpected response from order backend (HTTP {s})"),
    }
}

/// Build the shared HTTP client with the default timeout.
pub(crate) fn build_client() -> Result<Client, ApiError> {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Generic JSON request
// ---------------------------------------------------------------------------

/// Perform a JSON request against the backend.
///
/// `path` includes the leading slash, e.g. `/kits/7/status/doces`.
/// Query parameters are appended properly encoded. Returns the JSON body,
/// or `Value::Null` for empty 204 responses.
pub(crate) async fn request_json(
    client: &Client,
    base: &str,
    path: &str,
    params: &[(&str, String)],
    method: Method,
    body: Option<&Value>,
) -> Result<Value, ApiError> {
    let mut url = Url::parse(&format!("{base}{path}"))
        .map_err(|e| ApiError::Network(format!("Invalid order backend URL: {e}")))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    debug!(%url, "backend request");

    let mut req = client.request(method, url).header("Accept", "application/json");
    if let Some(body) = body {
        req = req.json(body);
    }

    let resp = req.send().await.map_err(|e| friendly_error(base, &e))?;
    let status = resp.status();

    if !status.is_success() {
        // Preserve whatever detail the backend put in the body; it answers
        // with { "error": ... } or { "message": ... } on failures.
        let body_text = resp.text().await.unwrap_or_default();
        let message = if let Ok(json) = serde_json::from_str::<Value>(&body_text) {
            json.get("error")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str)
                .map(|s| s.to_string())
                .unwrap_or_else(|| status_error(status))
        } else if !body_text.trim().is_empty() {
            format!("{}: {}", status_error(status), body_text.trim())
        } else {
            status_error(status)
        };
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body_text = resp.text().await.unwrap_or_default();
    if body_text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body_text).map_err(|e| ApiError::InvalidJson(e.to_string()))
}
