//! Tool Registry and the Success.co tool collection.
//!
//! Every tool is a thin validate → build GraphQL → call upstream → reshape
//! function behind one uniform contract. The registry is built once at
//! process start and shared immutably by every per-session server, so the
//! per-connection factory stays cheap.

mod headlines;
mod issues;
mod meetings;
mod rocks;
pub mod scorecard;
mod teams;
mod todos;
mod users;
mod vision;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::{ApiResponse, GraphQlClient};

/// One block of tool output. MCP only ever sees text content from this
/// server; structured payloads are serialized JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
        }
    }

    pub fn json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }
}

/// Uniform invocation contract for the tool collection. The `AuthContext`
/// is an explicit parameter: handlers never reach into shared state for
/// the caller's identity.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    fn read_only(&self) -> bool {
        true
    }
    async fn call(
        &self,
        api: &GraphQlClient,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError>;
}

/// Static table of every tool, keyed by name. Immutable after construction.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        };

        teams::register(&mut registry);
        users::register(&mut registry);
        rocks::register(&mut registry);
        todos::register(&mut registry);
        issues::register(&mut registry);
        headlines::register(&mut registry);
        meetings::register(&mut registry);
        scorecard::register(&mut registry);
        vision::register(&mut registry);

        registry
    }

    pub(crate) fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        debug_assert!(
            !self.by_name.contains_key(name),
            "duplicate tool name: {name}"
        );
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.iter().map(|t| t.name())
    }

    /// The registry as a `tools/list` result.
    pub fn list_json(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema(),
                    "annotations": { "readOnlyHint": t.read_only() },
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    /// Route a `tools/call` by name. Unknown names and argument validation
    /// failures surface as typed errors; anything the handler itself
    /// returns is already a `ToolResult`.
    pub async fn dispatch(
        &self,
        api: &GraphQlClient,
        name: &str,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ServerError::UnknownTool(name.to_string()))?;
        tool.call(api, args, ctx).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared argument and reshaping helpers
// ---------------------------------------------------------------------------

pub(crate) fn require_str(args: &Value, key: &str) -> Result<String, ServerError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| ServerError::InvalidArguments(format!("'{key}' is required")))
}

pub(crate) fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

pub(crate) fn optional_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

/// Reshape a list-producing upstream response into the standard
/// `{ok, results}` payload. Upstream failure degrades to error-shaped
/// content, not a protocol error.
pub(crate) fn reshape_list(resp: ApiResponse, field: &str) -> ToolResult {
    if resp.ok {
        let results = resp
            .data
            .as_ref()
            .and_then(|d| d.get(field))
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        ToolResult::json(&json!({ "ok": true, "results": results }))
    } else {
        reshape_failure(resp)
    }
}

/// Reshape a single-object upstream response into `{ok, result}`.
pub(crate) fn reshape_node(resp: ApiResponse, field: &str) -> ToolResult {
    if resp.ok {
        let result = resp
            .data
            .as_ref()
            .and_then(|d| d.get(field))
            .cloned()
            .unwrap_or(Value::Null);
        ToolResult::json(&json!({ "ok": true, "result": result }))
    } else {
        reshape_failure(resp)
    }
}

pub(crate) fn reshape_failure(resp: ApiResponse) -> ToolResult {
    ToolResult::json(&json!({
        "ok": false,
        "error": resp.error.unwrap_or_else(|| "Unknown Success.co API error".to_string()),
    }))
}
