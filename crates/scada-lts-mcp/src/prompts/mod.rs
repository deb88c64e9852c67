// ABOUTME: Prompt registry mapping MCP prompt names to narrative composers
// ABOUTME: Provides the McpPrompt trait and the default SCADA-LTS prompt set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

pub mod analysis;
pub mod overview;

use std::collections::HashMap;

use async_trait::async_trait;
use scada_lts::compose::{self, PromptRequest};
use scada_lts::{ScadaClient, ScadaError};

use crate::protocol::{GetPromptResult, PromptDefinition};

/// Trait implemented by each MCP prompt exposed by this server
#[async_trait]
pub trait McpPrompt: Send + Sync {
    /// Return the prompt's MCP definition (name, description, arguments)
    fn definition(&self) -> PromptDefinition;

    /// Render the prompt; upstream failures degrade inside the text
    ///
    /// Errors are reserved for invalid arguments.
    async fn render(
        &self,
        client: &ScadaClient,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ScadaError>;
}

/// Registry mapping prompt names to their implementations
pub struct PromptRegistry {
    prompts: HashMap<String, Box<dyn McpPrompt>>,
}

impl PromptRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            prompts: HashMap::new(),
        }
    }

    /// Register a prompt, keyed by its definition name
    pub fn register(&mut self, prompt: Box<dyn McpPrompt>) {
        let name = prompt.definition().name;
        self.prompts.insert(name, prompt);
    }

    /// List all registered prompt definitions, sorted by name
    pub fn list_definitions(&self) -> Vec<PromptDefinition> {
        let mut definitions: Vec<_> = self.prompts.values().map(|p| p.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Render the named prompt
    pub async fn get(
        &self,
        name: &str,
        client: &ScadaClient,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, ScadaError> {
        match self.prompts.get(name) {
            Some(prompt) => prompt.render(client, arguments).await,
            None => Err(ScadaError::not_found("prompt", name)),
        }
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default prompt registry
pub fn build_prompt_registry() -> PromptRegistry {
    let mut registry = PromptRegistry::new();
    registry.register(Box::new(overview::SystemOverview));
    registry.register(Box::new(analysis::DataPointAnalysis));
    registry
}

/// Validate, compose, and wrap a prompt as a single user message
pub(crate) async fn compose_message(
    client: &ScadaClient,
    name: &str,
    arguments: &HashMap<String, String>,
) -> Result<GetPromptResult, ScadaError> {
    let request = PromptRequest::parse(name, arguments)?;
    let composed = compose::compose_request(client, request).await;
    Ok(GetPromptResult::user(composed.description, composed.text))
}
