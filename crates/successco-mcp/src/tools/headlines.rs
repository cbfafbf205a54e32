//! Headline tools (good/bad news shared in weekly meetings).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetHeadlines));
    registry.register(Arc::new(CreateHeadline));
}

struct GetHeadlines;

#[async_trait]
impl Tool for GetHeadlines {
    fn name(&self) -> &'static str {
        "get_headlines"
    }

    fn description(&self) -> &'static str {
        "List headlines, filterable by team."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "limit": { "type": "integer", "description": "Maximum headlines to return (default 50, max 200)" }
            },
            "additionalProperties": false
        })
    }

    async fn call(
        &self,
        api: &GraphQlClient,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let query = r"query Headlines($first: Int, $teamId: ID) {
            headlines(first: $first, teamId: $teamId) {
                id title notes teamId authorId createdAt
            }
        }";
        let variables = json!({
            "first": optional_u64(&args, "limit").unwrap_or(50).min(200),
            "teamId": optional_str(&args, "team_id"),
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "headlines"))
    }
}

struct CreateHeadline;

#[async_trait]
impl Tool for CreateHeadline {
    fn name(&self) -> &'static str {
        "create_headline"
    }

    fn description(&self) -> &'static str {
        "Share a headline with a team."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "notes": { "type": "string" },
                "team_id": { "type": "string" }
            },
            "required": ["title"],
            "additionalProperties": false
        })
    }

    fn read_only(&self) -> bool {
        false
    }

    async fn call(
        &self,
        api: &GraphQlClient,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let mut input = Map::new();
        input.insert("title".to_string(), Value::String(require_str(&args, "title")?));
        if let Some(v) = optional_str(&args, "notes") {
            input.insert("notes".to_string(), Value::String(v));
        }
        if let Some(v) = optional_str(&args, "team_id") {
            input.insert("teamId".to_string(), Value::String(v));
        }
        let query = r"mutation CreateHeadline($input: HeadlineCreateInput!) {
            headlineCreate(input: $input) {
                id title notes teamId authorId
            }
        }";
        let resp = api.call(ctx, query, json!({ "input": input })).await;
        Ok(reshape_node(resp, "headlineCreate"))
    }
}
