// ABOUTME: MCP tools for listing SCADA-LTS data sources and data points
// ABOUTME: Data points can be narrowed to a single data source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use async_trait::async_trait;
use scada_lts::tools::{GET_DATA_POINTS, GET_DATA_SOURCES};
use scada_lts::{ScadaClient, ToolRequest};
use serde_json::{json, Value};

use crate::protocol::{CallToolResult, ToolDefinition};
use crate::tools::{item_count, parse_request, run, unexpected_request, McpTool};

/// Lists every data source configured in SCADA-LTS
pub struct GetDataSources;

#[async_trait]
impl McpTool for GetDataSources {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_DATA_SOURCES.to_owned(),
            description: "Get all data sources from SCADA-LTS".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(GET_DATA_SOURCES, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        run(client, &request, |payload| {
            format!("Found {} data sources:", item_count(payload))
        })
        .await
    }
}

/// Lists data points, optionally for one data source
pub struct GetDataPoints;

#[async_trait]
impl McpTool for GetDataPoints {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_DATA_POINTS.to_owned(),
            description: "Get data points from SCADA-LTS, optionally filtered by data source"
                .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "data_source_id": {
                        "type": "integer",
                        "description": "Optional data source ID to filter data points"
                    }
                }
            }),
        }
    }

    async fn execute(&self, client: &ScadaClient, arguments: Value) -> CallToolResult {
        let request = match parse_request(GET_DATA_POINTS, &arguments) {
            Ok(request) => request,
            Err(result) => return result,
        };
        let ToolRequest::GetDataPoints { data_source_id } = request else {
            return unexpected_request(GET_DATA_POINTS, &request);
        };
        let filter = data_source_id.map_or_else(String::new, |id| format!(" for data source {id}"));
        run(client, &request, move |payload| {
            format!("Found {} data points{filter}:", item_count(payload))
        })
        .await
    }
}
