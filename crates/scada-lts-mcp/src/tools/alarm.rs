// ABOUTME: MCP tools for listing and acknowledging SCADA-LTS alarms
// ABOUTME: Listing defaults to active alarms only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use async_trait::async_trait;
use scada_lts::tools::{ACKNOWLEDGE_ALARM_TOOL, GET_ALARMS};
use scada_lts::{ScadaClient, ToolRequest};
use serde_json::{json, Value};

use crate::protocol::{CallToolResult, ToolDefinition};
use crate::tools::{item_count, parse_request, run, unexpected_request, McpTool};

/// Lists alarms
pub struct GetAlarms;

#[async_trait]
impl McpTool for GetAlarms {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_ALARMS.to_owned(),
            description: "Get alarms from SCADA-LTS".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "active_only": {
                        "type": "boolean",
                        "description": "Only return active alarms",
                        "default": true
                    }
                }
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(GET_ALARMS, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        let ToolRequest::GetAlarms { active_only } = request else {
            return unexpected_request(GET_ALARMS, &request);
        };
        let scope = if active_only { "active" } else { "all" };
        run(client, &request, move |payload| {
            format!("Found {} {scope} alarms:", item_count(payload))
        })
        .await
    }
}

/// Acknowledges one alarm
pub struct AcknowledgeAlarm;

#[async_trait]
impl McpTool for AcknowledgeAlarm {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: ACKNOWLEDGE_ALARM_TOOL.to_owned(),
            description: "Acknowledge an alarm".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarm_id": {
                        "type": "integer",
                        "description": "ID of the alarm to acknowledge"
                    }
                },
                "required": ["alarm_id"]
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(ACKNOWLEDGE_ALARM_TOOL, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        let ToolRequest::AcknowledgeAlarm { alarm_id } = request else {
            return unexpected_request(ACKNOWLEDGE_ALARM_TOOL, &request);
        };
        run(client, &request, move |_| {
            format!("Acknowledging alarm {alarm_id}: successful")
        })
        .await
    }
}
