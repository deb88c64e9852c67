// ABOUTME: HTTP transport implementing MCP Streamable HTTP with JSON and SSE responses
// ABOUTME: Serves a POST endpoint that accepts JSON-RPC and responds via JSON or event stream
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::stream;
use scada_lts::ScadaError;
use tracing::{debug, error, info};

use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::server::McpServer;
use crate::transport::McpTransport;

/// `POST /mcp` listener
///
/// Each request body is one JSON-RPC message. The reply is plain JSON unless
/// the `Accept` header lists `text/event-stream`, in which case it is sent as
/// a single SSE event.
pub struct HttpTransport {
    host: String,
    port: u16,
}

impl HttpTransport {
    /// Create an HTTP transport bound to the given host and port
    pub const fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }
}

/// Build the `/mcp` router around a server
pub fn build_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .with_state(server)
}

#[async_trait]
impl McpTransport for HttpTransport {
    async fn serve(self, server: Arc<McpServer>) -> Result<(), ScadaError> {
        let app = build_router(server);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ScadaError::internal(format!("Failed to bind {addr}: {e}")))?;

        info!(address = %addr, "Serving MCP over HTTP");

        axum::serve(listener, app)
            .await
            .map_err(|e| ScadaError::internal(format!("HTTP server error: {e}")))?;

        Ok(())
    }
}

async fn handle_mcp_post(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Rejecting unparseable /mcp body");
            let resp = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
    };

    debug!(method = %request.method, "POST /mcp");

    let Some(response) = server.handle_request(request).await else {
        return StatusCode::NO_CONTENT.into_response();
    };

    if accepts_event_stream(&headers) {
        sse_reply(&response)
    } else {
        Json(response).into_response()
    }
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|accept| accept.contains("text/event-stream"))
}

fn sse_reply(response: &JsonRpcResponse) -> Response {
    let data = serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(
            r#"{{"jsonrpc":"2.0","error":{{"code":-32603,"message":"Serialization failed: {e}"}}}}"#
        )
    });

    let event = Event::default().data(data);
    let event_stream = stream::once(async { Ok::<_, Infallible>(event) });

    Sse::new(event_stream).into_response()
}
