// ABOUTME: MCP prompt analysing one data source and the live values of its points
// ABOUTME: Requires the data source id; unknown ids produce a not-found message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::collections::HashMap;

use async_trait::async_trait;
use scada_lts::compose::DATA_POINT_ANALYSIS;
use scada_lts::{ScadaClient, ScadaError};

use crate::prompts::{compose_message, McpPrompt};
use crate::protocol::{GetPromptResult, PromptArgument, PromptDefinition};

/// Analysis of the data points of one data source
pub struct DataPointAnalysis;

#[async_trait]
impl McpPrompt for DataPointAnalysis {
    fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: DATA_POINT_ANALYSIS.to_owned(),
            description: "Analyze data points for a specific data source".to_owned(),
            arguments: vec![PromptArgument {
                name: "data_source_id".to_owned(),
                description: "ID of the data source to analyze".to_owned(),
                required: true,
            }],
        }
    }

    async fn render(
        &self,
        client: &ScadaClient,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ScadaError> {
        compose_message(client, DATA_POINT_ANALYSIS, arguments).await
    }
}
