// ABOUTME: MCP tools for reading and writing SCADA-LTS data point values
// ABOUTME: Writes are coerced to the point's declared data type before leaving the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use async_trait::async_trait;
use scada_lts::tools::{GET_POINT_VALUE, SET_POINT_VALUE};
use scada_lts::{ScadaClient, ToolRequest};
use serde_json::{json, Value};

use crate::protocol::{CallToolResult, ToolDefinition};
use crate::tools::{parse_request, run, unexpected_request, McpTool};

/// Reads the latest value of a data point
pub struct GetPointValue;

#[async_trait]
impl McpTool for GetPointValue {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_POINT_VALUE.to_owned(),
            description: "Get the current value of a specific data point".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "point_id": {
                        "type": "integer",
                        "description": "ID of the data point"
                    }
                },
                "required": ["point_id"]
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(GET_POINT_VALUE, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        let ToolRequest::GetPointValue { point_id } = request else {
            return unexpected_request(GET_POINT_VALUE, &request);
        };
        run(client, &request, move |_| format!("Point {point_id} value:")).await
    }
}

/// Writes the value of a settable data point
pub struct SetPointValue;

#[async_trait]
impl McpTool for SetPointValue {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SET_POINT_VALUE.to_owned(),
            description: "Set the value of a data point (if settable)".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "point_id": {
                        "type": "integer",
                        "description": "ID of the data point"
                    },
                    "value": {
                        "type": ["number", "boolean", "string"],
                        "description": "Value to set"
                    },
                    "data_type": {
                        "type": "string",
                        "enum": ["binary", "multistate", "numeric", "alphanumeric"],
                        "description": "Declared data type of the point; the value is coerced to it"
                    }
                },
                "required": ["point_id", "value"]
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(SET_POINT_VALUE, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        let ToolRequest::SetPointValue { point_id, value } = &request else {
            return unexpected_request(SET_POINT_VALUE, &request);
        };
        let summary = format!("Setting point {point_id} to {value}: successful");
        run(client, &request, move |_| summary).await
    }
}
