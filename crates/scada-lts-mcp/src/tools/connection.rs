// ABOUTME: MCP tool for pointing the server at a SCADA-LTS instance
// ABOUTME: Replaces the connection config, resets the session, and reports the eager login outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use async_trait::async_trait;
use scada_lts::tools::CONFIGURE_CONNECTION;
use scada_lts::ScadaClient;
use serde_json::{json, Value};

use crate::protocol::{CallToolResult, ToolDefinition};
use crate::tools::{parse_request, run, McpTool};

/// Configures the SCADA-LTS base URL and optional credentials
pub struct ConfigureConnection;

#[async_trait]
impl McpTool for ConfigureConnection {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: CONFIGURE_CONNECTION.to_owned(),
            description: "Configure the connection to a SCADA-LTS server. Replaces any previous \
                          connection and logs in when credentials are given."
                .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base_url": {
                        "type": "string",
                        "description": "Base URL of the SCADA-LTS server (e.g. http://localhost:8080/Scada-LTS)"
                    },
                    "username": {
                        "type": "string",
                        "description": "Username for authentication"
                    },
                    "password": {
                        "type": "string",
                        "description": "Password for authentication"
                    }
                },
                "required": ["base_url"]
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(CONFIGURE_CONNECTION, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };

        run(client, &request, summary).await
    }
}

fn summary(payload: &Value) -> String {
    let base_url = payload["base_url"].as_str().unwrap_or_default();
    let authentication = match payload["authentication"].as_str() {
        Some("failed") => format!(
            "failed ({})",
            payload["error"].as_str().unwrap_or("unknown reason")
        ),
        Some(outcome) => outcome.to_owned(),
        None => "unknown".to_owned(),
    };
    format!("Connection configured for {base_url}. Authentication: {authentication}")
}
