// ABOUTME: Executes one logical SCADA-LTS operation against the upstream with session handling
// ABOUTME: Renders the URL, attaches the bearer token, and retries exactly once after a token rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::endpoints::{self, Operation};
use crate::http::{self, UpstreamResponse};
use crate::session::{SessionLease, SessionManager};
use crate::types::{ScadaError, ToolCallResult};

/// Query string and JSON body of one upstream call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPayload {
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestPayload {
    /// Empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the JSON request body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Query parameters in insertion order
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// JSON body, if any
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Runs operations from the endpoint registry through the session manager
#[derive(Clone)]
pub struct RequestExecutor {
    session: Arc<SessionManager>,
    http: reqwest::Client,
}

impl RequestExecutor {
    /// Create an executor sharing the session manager's HTTP client
    pub fn new(session: Arc<SessionManager>, http: reqwest::Client) -> Self {
        Self { session, http }
    }

    /// Execute an operation and wrap the outcome as a tool result
    pub async fn execute(
        &self,
        operation: &str,
        path_params: &[(&str, String)],
        payload: &RequestPayload,
    ) -> ToolCallResult {
        self.call(operation, path_params, payload).await.into()
    }

    /// Execute an operation, returning the parsed JSON body
    ///
    /// Validation of the operation name and path parameters happens before
    /// any login. A 401/403 on an authenticated endpoint expires the session,
    /// triggers one fresh login, and retries once; a second rejection is an
    /// auth error.
    #[instrument(skip(self, path_params, payload))]
    pub async fn call(
        &self,
        operation: &str,
        path_params: &[(&str, String)],
        payload: &RequestPayload,
    ) -> Result<Value, ScadaError> {
        let op = endpoints::resolve(operation)?;
        let path = op.render(path_params)?;

        let lease = self.session.lease(op.requires_auth).await?;
        let response = self.send(op, &path, &lease, payload).await?;

        let response = if op.requires_auth && response.is_auth_rejection() {
            info!(status = response.status, "Upstream rejected session, re-authenticating");
            self.session.mark_expired(&lease).await;
            let lease = self.session.ensure_authenticated().await?;
            let retry = self.send(op, &path, &lease, payload).await?;
            if retry.is_auth_rejection() {
                self.session.mark_expired(&lease).await;
                return Err(ScadaError::auth_rejected(retry.status, retry.body));
            }
            retry
        } else {
            response
        };

        if !response.is_success() {
            return Err(ScadaError::upstream(response.status, response.body));
        }
        http::parse_json_body(&response.body)
    }

    async fn send(
        &self,
        op: &Operation,
        path: &endpoints::RenderedPath,
        lease: &SessionLease,
        payload: &RequestPayload,
    ) -> Result<UpstreamResponse, ScadaError> {
        let url = path.url(lease.config().base_url())?;
        let target = format!("{} {}", op.method, url.path());

        let mut request = self
            .http
            .request(op.method.as_reqwest(), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = lease.token() {
            request = request.bearer_auth(token);
        }
        if !payload.query.is_empty() {
            request = request.query(&payload.query);
        }
        if let Some(body) = &payload.body {
            request = request.json(body);
        }

        let response = http::send(request, &target).await?;
        debug!(
            request = %target,
            status = response.status,
            generation = lease.generation(),
            "Operation response received"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::types::ErrorKind;

    fn executor() -> (Arc<SessionManager>, RequestExecutor) {
        let http = reqwest::Client::new();
        let session = Arc::new(SessionManager::new(http.clone()));
        (Arc::clone(&session), RequestExecutor::new(session, http))
    }

    #[test]
    fn payload_builders() {
        let payload = RequestPayload::new()
            .with_query("active", "true")
            .with_body(serde_json::json!({"value": 1}));
        assert_eq!(payload.query(), &[("active".to_owned(), "true".to_owned())]);
        assert_eq!(payload.body(), Some(&serde_json::json!({"value": 1})));
    }

    #[tokio::test]
    async fn unknown_operation_fails_before_session() {
        let (_, executor) = executor();
        let result = executor
            .execute("reboot_plc", &[], &RequestPayload::new())
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFoundOperation));
    }

    #[tokio::test]
    async fn missing_path_param_fails_before_login() {
        let (session, executor) = executor();
        session
            .configure(ConnectionConfig::new("http://127.0.0.1:9").expect("valid"))
            .await;
        let err = executor
            .call(endpoints::READ_POINT_VALUE, &[], &RequestPayload::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            session.state().await,
            crate::session::AuthState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn unconfigured_call_is_auth_error() {
        let (_, executor) = executor();
        let err = executor
            .call(endpoints::SYSTEM_STATUS, &[], &RequestPayload::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
    }
}
