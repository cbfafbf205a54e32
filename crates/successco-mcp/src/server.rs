//! Per-session MCP protocol server.
//!
//! One dispatch path serves every transport (stdio, streamable HTTP,
//! legacy SSE). The factory is cheap: tool definitions live in the shared
//! immutable registry, so a new server per session only clones two Arcs.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RpcError, JSONRPC_VERSION, PROTOCOL_VERSION};
use crate::tools::ToolRegistry;

pub const SERVER_NAME: &str = "successco-mcp";

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    api: Arc<GraphQlClient>,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>, api: Arc<GraphQlClient>) -> Self {
        Self { registry, api }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch one JSON-RPC request as the given caller. Returns `None`
    /// for notifications. Handler failures are caught here and surfaced as
    /// protocol errors; nothing escapes as a panic or unhandled rejection.
    pub async fn handle(&self, request: JsonRpcRequest, ctx: &AuthContext) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            let id = request.id.clone().unwrap_or(Value::Null);
            return Some(JsonRpcResponse::error(
                id,
                RpcError::invalid_request(format!(
                    "jsonrpc must be \"{JSONRPC_VERSION}\" (got \"{}\")",
                    request.jsonrpc
                )),
            ));
        }

        let Some(id) = request.id.clone() else {
            // Notifications are consumed without a response.
            debug!(method = %request.method, "notification received");
            return None;
        };

        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize_result(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.registry.list_json()),
            "tools/call" => self.call_tool(request.params, ctx).await,
            // No resources are implemented; an empty list keeps clients
            // that probe for them happy.
            "resources/list" => Ok(json!({ "resources": [] })),
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let client = params
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(client = %client, "client initializing");

        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: Option<Value>, ctx: &AuthContext) -> Result<Value, RpcError> {
        let params = params
            .ok_or_else(|| RpcError::invalid_params("tools/call requires params with a tool name"))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("params.name must be a string"))?;
        let args = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        info!(tool = %name, api_key_mode = ctx.is_api_key_mode(), "call_tool");

        match self.registry.dispatch(&self.api, name, args, ctx).await {
            Ok(result) => serde_json::to_value(result)
                .map_err(|e| RpcError::internal("Failed to serialize tool result", Some(json!(e.to_string())))),
            Err(ServerError::UnknownTool(name)) => {
                warn!(tool = %name, "unknown tool requested");
                Err(RpcError::method_not_found(&format!("tools/call:{name}")))
            }
            Err(ServerError::InvalidArguments(message)) => Err(RpcError::invalid_params(message)),
            Err(e) => {
                warn!(tool = %name, "tool execution failed: {e}");
                Err(RpcError::internal(
                    "Tool execution failed",
                    Some(json!(e.to_string())),
                ))
            }
        }
    }
}
