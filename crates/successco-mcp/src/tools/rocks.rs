//! Rock (quarterly goal) tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

const ROCK_STATUSES: &[&str] = &["ON_TRACK", "OFF_TRACK", "DONE", "DROPPED"];

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetRocks));
    registry.register(Arc::new(CreateRock));
    registry.register(Arc::new(UpdateRock));
}

fn validate_status(status: &str) -> Result<(), ServerError> {
    if ROCK_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ServerError::InvalidArguments(format!(
            "'status' must be one of {} (got '{status}')",
            ROCK_STATUSES.join(", ")
        )))
    }
}

struct GetRocks;

#[async_trait]
impl Tool for GetRocks {
    fn name(&self) -> &'static str {
        "get_rocks"
    }

    fn description(&self) -> &'static str {
        "List rocks (quarterly goals), filterable by team, owner, and status."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "owner_id": { "type": "string" },
                "status": { "type": "string", "enum": ROCK_STATUSES },
                "limit": { "type": "integer", "description": "Maximum rocks to return (default 50, max 200)" }
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
        let status = optional_str(&args, "status");
        if let Some(s) = &status {
            validate_status(s)?;
        }
        let query = r"query Rocks($first: Int, $teamId: ID, $ownerId: ID, $status: RockStatus) {
            rocks(first: $first, teamId: $teamId, ownerId: $ownerId, status: $status) {
                id title description status dueDate ownerId teamId
            }
        }";
        let variables = json!({
            "first": optional_u64(&args, "limit").unwrap_or(50).min(200),
            "teamId": optional_str(&args, "team_id"),
            "ownerId": optional_str(&args, "owner_id"),
            "status": status,
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "rocks"))
    }
}

struct CreateRock;

#[async_trait]
impl Tool for CreateRock {
    fn name(&self) -> &'static str {
        "create_rock"
    }

    fn description(&self) -> &'static str {
        "Create a rock. Requires a title; team, owner, and due date are optional."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "description": { "type": "string" },
                "team_id": { "type": "string" },
                "owner_id": { "type": "string" },
                "due_date": { "type": "string", "description": "ISO date, e.g. 2026-09-30" }
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
        for (arg, field) in [
            ("description", "description"),
            ("team_id", "teamId"),
            ("owner_id", "ownerId"),
            ("due_date", "dueDate"),
        ] {
            if let Some(v) = optional_str(&args, arg) {
                input.insert(field.to_string(), Value::String(v));
            }
        }
        let query = r"mutation CreateRock($input: RockCreateInput!) {
            rockCreate(input: $input) {
                id title description status dueDate ownerId teamId
            }
        }";
        let resp = api.call(ctx, query, json!({ "input": input })).await;
        Ok(reshape_node(resp, "rockCreate"))
    }
}

struct UpdateRock;

#[async_trait]
impl Tool for UpdateRock {
    fn name(&self) -> &'static str {
        "update_rock"
    }

    fn description(&self) -> &'static str {
        "Update a rock's title, description, status, owner, or due date."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "rock_id": { "type": "string" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "status": { "type": "string", "enum": ROCK_STATUSES },
                "owner_id": { "type": "string" },
                "due_date": { "type": "string" }
            },
            "required": ["rock_id"],
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
        let rock_id = require_str(&args, "rock_id")?;
        let mut input = Map::new();
        for (arg, field) in [
            ("title", "title"),
            ("description", "description"),
            ("status", "status"),
            ("owner_id", "ownerId"),
            ("due_date", "dueDate"),
        ] {
            if let Some(v) = optional_str(&args, arg) {
                if arg == "status" {
                    validate_status(&v)?;
                }
                input.insert(field.to_string(), Value::String(v));
            }
        }
        if input.is_empty() {
            return Err(ServerError::InvalidArguments(
                "at least one field to update is required".to_string(),
            ));
        }
        let query = r"mutation UpdateRock($id: ID!, $input: RockUpdateInput!) {
            rockUpdate(id: $id, input: $input) {
                id title description status dueDate ownerId teamId
            }
        }";
        let resp = api
            .call(ctx, query, json!({ "id": rock_id, "input": input }))
            .await;
        Ok(reshape_node(resp, "rockUpdate"))
    }
}
