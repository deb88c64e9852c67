// ABOUTME: Library root re-exporting MCP server modules for the binary and integration tests
// ABOUTME: Exposes protocol types, the server router, tool and prompt registries, and transports
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

pub mod prompts;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod tools;
pub mod transport;

use scada_lts::ScadaClient;

use prompts::build_prompt_registry;
use server::McpServer;
use tools::build_tool_registry;

/// Build a server with the default tool and prompt registries
pub fn build_server(client: ScadaClient) -> McpServer {
    McpServer::new(client, build_tool_registry(), build_prompt_registry())
}
