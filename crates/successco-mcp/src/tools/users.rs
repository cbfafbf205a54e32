//! User tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetUsers));
    registry.register(Arc::new(GetUser));
}

struct GetUsers;

#[async_trait]
impl Tool for GetUsers {
    fn name(&self) -> &'static str {
        "get_users"
    }

    fn description(&self) -> &'static str {
        "List users in the company, optionally scoped to one team."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string", "description": "Only users belonging to this team" },
                "search": { "type": "string", "description": "Substring match on name or email" },
                "limit": { "type": "integer", "description": "Maximum users to return (default 50, max 200)" }
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
        let limit = optional_u64(&args, "limit").unwrap_or(50).min(200);
        let query = r"query Users($first: Int, $teamId: ID, $search: String) {
            users(first: $first, teamId: $teamId, search: $search) {
                id firstName lastName email role teamIds
            }
        }";
        let variables = json!({
            "first": limit,
            "teamId": optional_str(&args, "team_id"),
            "search": optional_str(&args, "search"),
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "users"))
    }
}

struct GetUser;

#[async_trait]
impl Tool for GetUser {
    fn name(&self) -> &'static str {
        "get_user"
    }

    fn description(&self) -> &'static str {
        "Fetch one user by id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string", "description": "User id" }
            },
            "required": ["user_id"],
            "additionalProperties": false
        })
    }

    async fn call(
        &self,
        api: &GraphQlClient,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let user_id = require_str(&args, "user_id")?;
        let query = r"query User($id: ID!) {
            user(id: $id) {
                id firstName lastName email role teamIds createdAt
            }
        }";
        let resp = api.call(ctx, query, json!({ "id": user_id })).await;
        Ok(reshape_node(resp, "user"))
    }
}
