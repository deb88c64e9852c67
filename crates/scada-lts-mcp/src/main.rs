// ABOUTME: CLI entry point for the SCADA-LTS MCP server binary
// ABOUTME: Parses arguments, layers connection defaults, selects transport (stdio or HTTP), and starts serving
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use scada_lts::config::{env_non_empty, FileConfig};
use scada_lts::{ScadaClient, ScadaError};

use scada_lts_mcp::build_server;
use scada_lts_mcp::settings::{self, ConnectionFlags};
use scada_lts_mcp::transport::{self, McpTransport};

/// scada-lts-mcp: MCP server exposing a SCADA-LTS instance via Model Context Protocol
#[derive(Parser)]
#[command(name = "scada-lts-mcp", version, about)]
struct Cli {
    /// Transport mode: "stdio" for stdin/stdout or "http" for HTTP+SSE
    #[arg(long, default_value = "stdio")]
    transport: String,

    /// HTTP listen port (only used with --transport http)
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// HTTP listen host (only used with --transport http)
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Default SCADA-LTS base URL (e.g. <http://localhost:8080/Scada-LTS>)
    #[arg(long)]
    base_url: Option<String>,

    /// Default SCADA-LTS username
    #[arg(long)]
    username: Option<String>,

    /// Default SCADA-LTS password
    #[arg(long)]
    password: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Config file (defaults to <config dir>/scada-lts/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr to keep stdout clean for stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => FileConfig::load_default()?,
    };
    let flags = ConnectionFlags {
        base_url: cli.base_url,
        username: cli.username,
        password: cli.password,
        timeout_secs: cli.timeout_secs,
    };
    let settings = settings::resolve(&flags, env_non_empty, file.as_ref())?;

    let client = match settings.connection {
        Some(connection) => {
            tracing::info!(
                base_url = %connection.base_url(),
                has_credentials = connection.has_credentials(),
                "Default SCADA-LTS connection configured"
            );
            ScadaClient::with_connection(&settings.client, connection).await?
        }
        None => ScadaClient::new(&settings.client)?,
    };
    let server = Arc::new(build_server(client));

    tracing::info!(
        transport = %cli.transport,
        timeout = ?settings.client.timeout,
        "Starting SCADA-LTS MCP server"
    );

    match cli.transport.as_str() {
        "stdio" => {
            transport::stdio::StdioTransport.serve(server).await?;
        }
        "http" => {
            transport::http::HttpTransport::new(cli.host, cli.port)
                .serve(server)
                .await?;
        }
        other => {
            return Err(ScadaError::validation(format!(
                "Unknown transport: {other}. Valid: stdio, http"
            ))
            .into());
        }
    }

    Ok(())
}
