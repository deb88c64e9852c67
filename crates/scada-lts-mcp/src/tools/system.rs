// ABOUTME: MCP tool reporting SCADA-LTS system status
// ABOUTME: Tags the upstream status with the local session state it was read under
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use async_trait::async_trait;
use scada_lts::tools::GET_SYSTEM_STATUS;
use scada_lts::ScadaClient;
use serde_json::{json, Value};
use tracing::debug;

use crate::protocol::{CallToolResult, ToolDefinition};
use crate::tools::{error_result, parse_request, summarized, McpTool};

/// Reads system status and information
pub struct GetSystemStatus;

#[async_trait]
impl McpTool for GetSystemStatus {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_SYSTEM_STATUS.to_owned(),
            description: "Get SCADA-LTS system status and information".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(GET_SYSTEM_STATUS, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        let payload = match client.call(&request).await {
            Ok(payload) => payload,
            Err(e) => return error_result(&e),
        };

        let snapshot = client.session().snapshot().await;
        debug!(state = %snapshot.state, generation = snapshot.generation, "Session after status read");
        summarized(&format!("System status (session {}):", snapshot.state), &payload)
    }
}
