// ABOUTME: Line-delimited JSON-RPC over stdin/stdout for MCP hosts that spawn the server
// ABOUTME: The loop is generic over reader and writer so it can be driven from memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::sync::Arc;

use async_trait::async_trait;
use scada_lts::ScadaError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error};

use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::server::McpServer;
use crate::transport::McpTransport;

/// One JSON-RPC message per stdin line, one reply per stdout line
pub struct StdioTransport;

#[async_trait]
impl McpTransport for StdioTransport {
    async fn serve(self, server: Arc<McpServer>) -> Result<(), ScadaError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        debug!("Reading MCP requests from stdin");
        serve_lines(&server, stdin, &mut stdout).await?;
        debug!("stdin closed");
        Ok(())
    }
}

/// Answer each line of `input` on `output` until end of input
///
/// Blank lines are skipped; a line that is not JSON-RPC gets a parse error
/// reply with no id.
pub async fn serve_lines<R, W>(
    server: &McpServer,
    input: R,
    output: &mut W,
) -> Result<(), ScadaError>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let mut lines = input.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| ScadaError::internal(format!("Failed to read request line: {e}")))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                error!(error = %e, "Unparseable request line");
                let resp = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                write_response(output, &resp).await?;
                continue;
            }
        };

        debug!(method = %request.method, "Handling MCP request");

        if let Some(response) = server.handle_request(request).await {
            write_response(output, &response).await?;
        }
    }

    Ok(())
}

async fn write_response<W>(output: &mut W, response: &JsonRpcResponse) -> Result<(), ScadaError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut line = serde_json::to_vec(response)
        .map_err(|e| ScadaError::internal(format!("Failed to serialize reply: {e}")))?;
    line.push(b'\n');

    let write_failed = |e: std::io::Error| ScadaError::internal(format!("Failed to write reply: {e}"));
    output.write_all(&line).await.map_err(write_failed)?;
    output.flush().await.map_err(write_failed)
}
