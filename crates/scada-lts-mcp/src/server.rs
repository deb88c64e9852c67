// ABOUTME: MCP server core that routes JSON-RPC requests to protocol handlers, tools, and prompts
// ABOUTME: Implements initialize, tools/list, tools/call, prompts/list, prompts/get, and ping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use scada_lts::{ErrorKind, ScadaClient, ScadaError};
use serde_json::Value;
use tracing::{debug, info};

use crate::prompts::PromptRegistry;
use crate::protocol::{
    CallToolParams, GetPromptParams, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, PromptsCapability, PromptsListResult, ServerCapabilities, ServerInfo,
    ToolsCapability, ToolsListResult, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION,
};
use crate::tools::ToolRegistry;

/// MCP server that dispatches JSON-RPC requests to the appropriate handler
///
/// Owns the SCADA-LTS client and both registries. Transport layers feed
/// parsed requests into `handle_request` and send the returned responses.
pub struct McpServer {
    client: ScadaClient,
    tools: ToolRegistry,
    prompts: PromptRegistry,
}

impl McpServer {
    /// Create a server around a client and its tool and prompt registries
    pub const fn new(client: ScadaClient, tools: ToolRegistry, prompts: PromptRegistry) -> Self {
        Self {
            client,
            tools,
            prompts,
        }
    }

    /// SCADA-LTS client shared by every tool and prompt
    pub const fn client(&self) -> &ScadaClient {
        &self.client
    }

    /// Route a JSON-RPC request to the appropriate MCP handler
    ///
    /// Returns `None` for notifications (requests without an id).
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                format!("Unsupported JSON-RPC version: {}", request.jsonrpc),
            ));
        }

        // Notifications have no id and expect no response
        if request.id.is_none() {
            debug!(method = %request.method, "Received notification, no response");
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => Self::handle_initialize(request.id, request.params),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "prompts/list" => self.handle_prompts_list(request.id),
            "prompts/get" => self.handle_prompts_get(request.id, request.params).await,
            "ping" => JsonRpcResponse::success(request.id, Value::Object(serde_json::Map::new())),
            method => {
                debug!(method, "Unknown MCP method");
                JsonRpcResponse::error(
                    request.id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                )
            }
        };

        Some(response)
    }

    /// Handle `initialize`: log client info and return server capabilities
    fn handle_initialize(id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params {
            if let Ok(init) = serde_json::from_value::<InitializeParams>(params) {
                info!(
                    client = %init.client_info.name,
                    version = ?init.client_info.version,
                    protocol = %init.protocol_version,
                    capabilities = %init.capabilities,
                    "MCP client connected"
                );
            }
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_owned(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
                prompts: Some(PromptsCapability {}),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: SERVER_VERSION.to_owned(),
            },
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    /// Handle `tools/list`: return all registered tool definitions
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.tools.list_definitions(),
        };
        JsonRpcResponse::from_serializable(id, &result)
    }

    /// Handle `tools/call`: dispatch to the named tool handler
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let call_params: CallToolParams = match parse_params(params, "tools/call") {
            Ok(cp) => cp,
            Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, message),
        };

        let arguments = call_params.arguments.unwrap_or(Value::Null);
        debug!(tool = %call_params.name, "Calling tool");

        let result = self
            .tools
            .execute(&call_params.name, &self.client, arguments)
            .await;

        JsonRpcResponse::from_serializable(id, &result)
    }

    /// Handle `prompts/list`: return all registered prompt definitions
    fn handle_prompts_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = PromptsListResult {
            prompts: self.prompts.list_definitions(),
        };
        JsonRpcResponse::from_serializable(id, &result)
    }

    /// Handle `prompts/get`: render the named prompt
    async fn handle_prompts_get(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let get_params: GetPromptParams = match parse_params(params, "prompts/get") {
            Ok(gp) => gp,
            Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, message),
        };

        let arguments = get_params.arguments.unwrap_or_default();
        debug!(prompt = %get_params.name, "Rendering prompt");

        match self
            .prompts
            .get(&get_params.name, &self.client, &arguments)
            .await
        {
            Ok(result) => JsonRpcResponse::from_serializable(id, &result),
            Err(e) => JsonRpcResponse::error(id, prompt_error_code(&e), e.to_string()),
        }
    }
}

/// Deserialize required method params
fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
    method: &str,
) -> Result<T, String> {
    let Some(params) = params else {
        return Err(format!("Missing params for {method}"));
    };
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {e}"))
}

/// JSON-RPC code for a prompt rendering failure
const fn prompt_error_code(err: &ScadaError) -> i32 {
    match err.kind {
        ErrorKind::Validation | ErrorKind::NotFoundOperation => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    }
}
