// ABOUTME: Upstream HTTP plumbing shared by login and request execution
// ABOUTME: Builds the timeout-bounded reqwest client and maps transport failures to typed errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::time::Instant;

use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::types::ScadaError;

/// User agent sent with every upstream request
const USER_AGENT: &str = concat!("scada-lts/", env!("CARGO_PKG_VERSION"));

/// Raw outcome of one upstream HTTP exchange
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text (lossy UTF-8)
    pub body: String,
}

impl UpstreamResponse {
    /// Whether the status is 2xx
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the upstream rejected the request's credentials
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Build the HTTP client used for every upstream call
///
/// The configured timeout bounds each request end to end, login included.
pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client, ScadaError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ScadaError::internal(format!("Failed to build HTTP client: {e}")))
}

/// Send a prepared request and read the whole body
///
/// `target` names the request in logs and error messages (method and path,
/// never credentials).
///
/// # Errors
///
/// Returns a connectivity error if the request cannot be sent, times out,
/// or the body cannot be read. Non-2xx statuses are not errors here.
pub async fn send(request: RequestBuilder, target: &str) -> Result<UpstreamResponse, ScadaError> {
    let start = Instant::now();

    let response = request
        .send()
        .await
        .map_err(|e| transport_error(&e, target))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(&e, target))?;

    debug!(request = target, status, duration = ?start.elapsed(), "Upstream request completed");

    Ok(UpstreamResponse { status, body })
}

/// Map a `reqwest` failure to a connectivity error
pub fn transport_error(err: &reqwest::Error, target: &str) -> ScadaError {
    warn!(request = target, error = %err, "Upstream transport failure");
    if err.is_timeout() {
        ScadaError::connectivity(format!("{target} timed out: {err}"))
    } else if err.is_connect() {
        ScadaError::connectivity(format!("Failed to connect for {target}: {err}"))
    } else {
        ScadaError::connectivity(format!("{target} failed: {err}"))
    }
}

/// Parse a 2xx body as JSON; an empty body is `null`
pub fn parse_json_body(body: &str) -> Result<Value, ScadaError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| ScadaError::parse(format!("Malformed upstream response body: {e}")))
}
