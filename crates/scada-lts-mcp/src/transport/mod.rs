// ABOUTME: Channels the SCADA-LTS MCP server can be served over
// ABOUTME: stdio for a spawned child process, HTTP for a long-running service
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

pub mod http;
pub mod stdio;

use std::sync::Arc;

use async_trait::async_trait;
use scada_lts::ScadaError;

use crate::server::McpServer;

/// Feeds JSON-RPC requests from one channel into the server
#[async_trait]
pub trait McpTransport: Send {
    /// Serve until the channel closes or the listener fails
    async fn serve(self, server: Arc<McpServer>) -> Result<(), ScadaError>;
}
