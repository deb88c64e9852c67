// ABOUTME: Tool registry that maps MCP tool names to handler implementations
// ABOUTME: Provides the McpTool trait, result rendering helpers, and the default SCADA-LTS tool set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

pub mod alarm;
pub mod connection;
pub mod data_source;
pub mod point_value;
pub mod system;

use std::collections::HashMap;

use async_trait::async_trait;
use scada_lts::{ScadaClient, ScadaError, ToolRequest};
use serde_json::Value;
use tracing::debug;

use crate::protocol::{CallToolResult, ToolDefinition};

/// Trait implemented by each MCP tool exposed by this server
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Return the tool's MCP definition (name, description, input schema)
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments against the SCADA-LTS client
    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult;
}

/// Registry mapping tool names to their handler implementations
///
/// Tools are registered at server startup and looked up by name
/// when `tools/call` requests arrive from the MCP client.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool handler, keyed by its definition name
    pub fn register(&mut self, tool: Box<dyn McpTool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    /// List all registered tool definitions, sorted by name
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Dispatch a `tools/call` to the named tool handler
    pub async fn execute(
        &self,
        name: &str,
        client: &ScadaClient,
        arguments: Value,
    ) -> CallToolResult {
        match self.tools.get(name) {
            Some(tool) => tool.execute(client, arguments).await,
            None => error_result(&ScadaError::not_found("tool", name)),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default tool registry with all SCADA-LTS MCP tools
pub fn build_tool_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(connection::ConfigureConnection));
    registry.register(Box::new(data_source::GetDataSources));
    registry.register(Box::new(data_source::GetDataPoints));
    registry.register(Box::new(point_value::GetPointValue));
    registry.register(Box::new(point_value::SetPointValue));
    registry.register(Box::new(alarm::GetAlarms));
    registry.register(Box::new(alarm::AcknowledgeAlarm));
    registry.register(Box::new(system::GetSystemStatus));
    registry
}

// ============================================================================
// Rendering Helpers
// ============================================================================

/// Render a failure as an MCP error result
pub(crate) fn error_result(err: &ScadaError) -> CallToolResult {
    CallToolResult::error(err.to_string())
}

/// Error result for a request that parsed into another tool's variant
pub(crate) fn unexpected_request(tool: &str, request: &ToolRequest) -> CallToolResult {
    error_result(&ScadaError::internal(format!(
        "{tool} received a {} request",
        request.tool_name()
    )))
}

/// Validate arguments into a typed request, or render the validation failure
pub(crate) fn parse_request(name: &str, arguments: &Value) -> Result<ToolRequest, CallToolResult> {
    ToolRequest::parse(name, arguments).map_err(|e| {
        debug!(tool = name, error = %e, "Rejected tool arguments");
        error_result(&e)
    })
}

/// Run a typed request and render the payload under a summary line
pub(crate) async fn run(
    client: &ScadaClient,
    request: &ToolRequest,
    summary: impl FnOnce(&Value) -> String + Send,
) -> CallToolResult {
    match client.call(request).await {
        Ok(payload) => summarized(&summary(&payload), &payload),
        Err(e) => error_result(&e),
    }
}

/// Summary line followed by the pretty-printed payload
pub(crate) fn summarized(summary: &str, payload: &Value) -> CallToolResult {
    let body = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    CallToolResult::text(format!("{summary}\n{body}"))
}

/// Number of items in a list payload
pub(crate) fn item_count(payload: &Value) -> usize {
    payload.as_array().map_or(0, Vec::len)
}
