// ABOUTME: JSON-RPC 2.0 envelopes and MCP payload types spoken by the SCADA-LTS server
// ABOUTME: Covers the handshake, tool listing and invocation, prompt listing and rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP revision negotiated in `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// `serverInfo.name`
pub const SERVER_NAME: &str = "scada-lts-mcp";

/// `serverInfo.version`
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Error codes
// ============================================================================

/// Body was not valid JSON-RPC
pub const PARSE_ERROR: i32 = -32_700;

/// Envelope is malformed or not version 2.0
pub const INVALID_REQUEST: i32 = -32_600;

/// No handler for the method
pub const METHOD_NOT_FOUND: i32 = -32_601;

/// Params missing or of the wrong shape
pub const INVALID_PARAMS: i32 = -32_602;

/// Handler failed for reasons outside the caller's control
pub const INTERNAL_ERROR: i32 = -32_603;

// ============================================================================
// Envelopes
// ============================================================================

/// A request or notification read from a transport
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0"
    pub jsonrpc: String,
    /// Absent on notifications
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Reply to a request carrying an id
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// `error` member of a failed reply
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Reply carrying `result`
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Reply carrying an error object
    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Serialize `result` into a success response, or an internal error
    pub fn from_serializable<T: Serialize>(id: Option<Value>, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(val) => Self::success(id, val),
            Err(e) => Self::error(id, INTERNAL_ERROR, format!("Serialization error: {e}")),
        }
    }
}

// ============================================================================
// Handshake
// ============================================================================

/// `initialize` params; only read for logging
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: ClientInfo,
}

/// `clientInfo` sent by the connecting client
#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// `initialize` result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Feature families this server answers
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
}

/// Serialized as `{}`; presence advertises `tools/*`
#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

/// Serialized as `{}`; presence advertises `prompts/*`
#[derive(Debug, Serialize)]
pub struct PromptsCapability {}

// ============================================================================
// Tools
// ============================================================================

/// Entry of `tools/list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the `arguments` object
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

/// `tools/call` params
#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// `tools/call` result; tool failures set `isError` instead of a JSON-RPC error
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ContentPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Text block shared by tool results and prompt messages
#[derive(Debug, Clone, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ContentPart {
    pub fn text(text: String) -> Self {
        Self {
            content_type: "text".to_owned(),
            text,
        }
    }
}

impl CallToolResult {
    /// Single text block
    pub fn text(content: String) -> Self {
        Self {
            content: vec![ContentPart::text(content)],
            is_error: None,
        }
    }

    /// Single text block flagged `isError`
    pub fn error(message: String) -> Self {
        Self {
            content: vec![ContentPart::text(message)],
            is_error: Some(true),
        }
    }
}

// ============================================================================
// Prompts
// ============================================================================

/// One argument accepted by a prompt
#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    /// Argument name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Whether the argument must be supplied
    pub required: bool,
}

/// Prompt definition exposed via `prompts/list`
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    /// Unique prompt name
    pub name: String,
    /// Human-readable prompt description
    pub description: String,
    /// Accepted arguments
    pub arguments: Vec<PromptArgument>,
}

/// Result of a `prompts/list` call
#[derive(Debug, Serialize)]
pub struct PromptsListResult {
    /// Available prompt definitions
    pub prompts: Vec<PromptDefinition>,
}

/// Parameters for a `prompts/get` request
#[derive(Debug, Deserialize)]
pub struct GetPromptParams {
    /// Name of the prompt to render
    pub name: String,
    /// Prompt arguments; MCP sends them as strings
    #[serde(default)]
    pub arguments: Option<HashMap<String, String>>,
}

/// A single message of a rendered prompt
#[derive(Debug, Serialize)]
pub struct PromptMessage {
    /// Speaker role ("user")
    pub role: String,
    /// Message content
    pub content: ContentPart,
}

/// Result of a `prompts/get` call
#[derive(Debug, Serialize)]
pub struct GetPromptResult {
    /// Short description of the rendered prompt
    pub description: String,
    /// Prompt messages
    pub messages: Vec<PromptMessage>,
}

impl GetPromptResult {
    /// Build a single user-message prompt result
    pub fn user(description: String, text: String) -> Self {
        Self {
            description,
            messages: vec![PromptMessage {
                role: "user".to_owned(),
                content: ContentPart::text(text),
            }],
        }
    }
}
