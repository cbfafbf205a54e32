//! Team tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetTeams));
    registry.register(Arc::new(GetTeam));
}

struct GetTeams;

#[async_trait]
impl Tool for GetTeams {
    fn name(&self) -> &'static str {
        "get_teams"
    }

    fn description(&self) -> &'static str {
        "List the company's teams, optionally filtered by a name search."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": { "type": "string", "description": "Case-insensitive substring match on team name" },
                "limit": { "type": "integer", "description": "Maximum teams to return (default 50, max 200)" }
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
        let search = optional_str(&args, "search");
        let query = r"query Teams($first: Int, $search: String) {
            teams(first: $first, search: $search) {
                id name description memberCount createdAt
            }
        }";
        let resp = api
            .call(ctx, query, json!({ "first": limit, "search": search }))
            .await;
        Ok(reshape_list(resp, "teams"))
    }
}

struct GetTeam;

#[async_trait]
impl Tool for GetTeam {
    fn name(&self) -> &'static str {
        "get_team"
    }

    fn description(&self) -> &'static str {
        "Fetch one team by id, including its members."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string", "description": "Team id" }
            },
            "required": ["team_id"],
            "additionalProperties": false
        })
    }

    async fn call(
        &self,
        api: &GraphQlClient,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let team_id = require_str(&args, "team_id")?;
        let query = r"query Team($id: ID!) {
            team(id: $id) {
                id name description createdAt
                members { id firstName lastName email role }
            }
        }";
        let resp = api.call(ctx, query, json!({ "id": team_id })).await;
        Ok(reshape_node(resp, "team"))
    }
}
