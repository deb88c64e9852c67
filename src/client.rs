// ABOUTME: ScadaClient capability object bundling the session manager and request executor
// ABOUTME: Dispatches named tool invocations to typed requests and the upstream operations behind them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ConnectionConfig};
use crate::executor::RequestExecutor;
use crate::http;
use crate::session::SessionManager;
use crate::tools::ToolRequest;
use crate::types::{ScadaError, ToolCallResult};

/// Handle to one SCADA-LTS connection: config, session, and executor
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct ScadaClient {
    session: Arc<SessionManager>,
    executor: RequestExecutor,
}

impl ScadaClient {
    /// Create an unconfigured client
    pub fn new(config: &ClientConfig) -> Result<Self, ScadaError> {
        let http = http::build_client(config)?;
        let session = Arc::new(SessionManager::new(http.clone()));
        let executor = RequestExecutor::new(Arc::clone(&session), http);
        Ok(Self { session, executor })
    }

    /// Create a client and apply a startup connection without logging in
    pub async fn with_connection(
        config: &ClientConfig,
        connection: ConnectionConfig,
    ) -> Result<Self, ScadaError> {
        let client = Self::new(config)?;
        client.session.configure(connection).await;
        Ok(client)
    }

    /// Session manager backing this client
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Validate and run a named tool invocation
    ///
    /// Never fails: every outcome, including unknown tools and bad
    /// arguments, is folded into the returned result.
    pub async fn dispatch(&self, tool_name: &str, arguments: &Value) -> ToolCallResult {
        let result = match ToolRequest::parse(tool_name, arguments) {
            Ok(request) => self.call(&request).await,
            Err(e) => {
                debug!(tool = tool_name, error = %e, "Tool arguments rejected");
                Err(e)
            }
        };
        result.into()
    }

    /// Run a validated tool request
    pub async fn call(&self, request: &ToolRequest) -> Result<Value, ScadaError> {
        if let ToolRequest::ConfigureConnection(config) = request {
            return Ok(self.configure_connection(config.clone()).await);
        }
        let call = request
            .upstream_call()
            .ok_or_else(|| ScadaError::internal("Tool has no upstream operation"))?;
        self.executor
            .call(call.operation, &call.path_params, &call.payload)
            .await
    }

    /// Replace the connection and, when credentials are present, log in eagerly
    ///
    /// The replacement always takes effect. The payload reports whether the
    /// eager login succeeded, failed (with the reason), or was deferred
    /// because the connection is a guest one.
    pub async fn configure_connection(&self, config: ConnectionConfig) -> Value {
        let base_url = config.base_url().to_owned();
        let username = config.username().map(ToOwned::to_owned);
        let has_credentials = config.has_credentials();

        let generation = self.session.configure(config).await;
        info!(base_url = %base_url, generation, "Connection configured");

        if !has_credentials {
            return json!({
                "base_url": base_url,
                "username": username,
                "authentication": "guest",
            });
        }

        match self.session.ensure_authenticated().await {
            Ok(_) => json!({
                "base_url": base_url,
                "username": username,
                "authentication": "successful",
            }),
            Err(e) => {
                warn!(base_url = %base_url, error = %e, "Eager login after configure failed");
                json!({
                    "base_url": base_url,
                    "username": username,
                    "authentication": "failed",
                    "error": e.to_string(),
                })
            }
        }
    }

    // ========================================================================
    // Convenience wrappers used by prompt composition
    // ========================================================================

    /// List all data sources
    pub async fn data_sources(&self) -> Result<Value, ScadaError> {
        self.call(&ToolRequest::GetDataSources).await
    }

    /// List data points, optionally for one data source
    pub async fn data_points(&self, data_source_id: Option<i64>) -> Result<Value, ScadaError> {
        self.call(&ToolRequest::GetDataPoints { data_source_id })
            .await
    }

    /// Read a point's latest value
    pub async fn point_value(&self, point_id: i64) -> Result<Value, ScadaError> {
        self.call(&ToolRequest::GetPointValue { point_id }).await
    }

    /// List alarms
    pub async fn alarms(&self, active_only: bool) -> Result<Value, ScadaError> {
        self.call(&ToolRequest::GetAlarms { active_only }).await
    }

    /// Read system status
    pub async fn system_status(&self) -> Result<Value, ScadaError> {
        self.call(&ToolRequest::GetSystemStatus).await
    }
}
