// ABOUTME: MCP prompt summarising the whole SCADA-LTS installation
// ABOUTME: Covers system status, data sources, data points, and optionally active alarms
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::collections::HashMap;

use async_trait::async_trait;
use scada_lts::compose::SYSTEM_OVERVIEW;
use scada_lts::{ScadaClient, ScadaError};

use crate::prompts::{compose_message, McpPrompt};
use crate::protocol::{GetPromptResult, PromptArgument, PromptDefinition};

/// Comprehensive overview of the SCADA-LTS system
pub struct SystemOverview;

#[async_trait]
impl McpPrompt for SystemOverview {
    fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: SYSTEM_OVERVIEW.to_owned(),
            description: "Get a comprehensive overview of the SCADA-LTS system".to_owned(),
            arguments: vec![PromptArgument {
                name: "include_alarms".to_owned(),
                description: "Whether to include alarm information (true/false)".to_owned(),
                required: false,
            }],
        }
    }

    async fn render(
        &self,
        client: &ScadaClient,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ScadaError> {
        compose_message(client, SYSTEM_OVERVIEW, arguments).await
    }
}
