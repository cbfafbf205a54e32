//! Todo tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetTodos));
    registry.register(Arc::new(CreateTodo));
    registry.register(Arc::new(UpdateTodo));
}

struct GetTodos;

#[async_trait]
impl Tool for GetTodos {
    fn name(&self) -> &'static str {
        "get_todos"
    }

    fn description(&self) -> &'static str {
        "List todos, filterable by team, assignee, and completion state."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "assignee_id": { "type": "string" },
                "completed": { "type": "boolean" },
                "limit": { "type": "integer", "description": "Maximum todos to return (default 50, max 200)" }
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
        let query = r"query Todos($first: Int, $teamId: ID, $assigneeId: ID, $completed: Boolean) {
            todos(first: $first, teamId: $teamId, assigneeId: $assigneeId, completed: $completed) {
                id title completed dueDate assigneeId teamId createdAt
            }
        }";
        let variables = json!({
            "first": optional_u64(&args, "limit").unwrap_or(50).min(200),
            "teamId": optional_str(&args, "team_id"),
            "assigneeId": optional_str(&args, "assignee_id"),
            "completed": args.get("completed").and_then(Value::as_bool),
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "todos"))
    }
}

struct CreateTodo;

#[async_trait]
impl Tool for CreateTodo {
    fn name(&self) -> &'static str {
        "create_todo"
    }

    fn description(&self) -> &'static str {
        "Create a todo. Requires a title; assignee, team, and due date are optional."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "team_id": { "type": "string" },
                "assignee_id": { "type": "string" },
                "due_date": { "type": "string", "description": "ISO date" }
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
            ("team_id", "teamId"),
            ("assignee_id", "assigneeId"),
            ("due_date", "dueDate"),
        ] {
            if let Some(v) = optional_str(&args, arg) {
                input.insert(field.to_string(), Value::String(v));
            }
        }
        let query = r"mutation CreateTodo($input: TodoCreateInput!) {
            todoCreate(input: $input) {
                id title completed dueDate assigneeId teamId
            }
        }";
        let resp = api.call(ctx, query, json!({ "input": input })).await;
        Ok(reshape_node(resp, "todoCreate"))
    }
}

struct UpdateTodo;

#[async_trait]
impl Tool for UpdateTodo {
    fn name(&self) -> &'static str {
        "update_todo"
    }

    fn description(&self) -> &'static str {
        "Update a todo's title, completion state, assignee, or due date."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "todo_id": { "type": "string" },
                "title": { "type": "string" },
                "completed": { "type": "boolean" },
                "assignee_id": { "type": "string" },
                "due_date": { "type": "string" }
            },
            "required": ["todo_id"],
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
        let todo_id = require_str(&args, "todo_id")?;
        let mut input = Map::new();
        for (arg, field) in [
            ("title", "title"),
            ("assignee_id", "assigneeId"),
            ("due_date", "dueDate"),
        ] {
            if let Some(v) = optional_str(&args, arg) {
                input.insert(field.to_string(), Value::String(v));
            }
        }
        if let Some(completed) = args.get("completed").and_then(Value::as_bool) {
            input.insert("completed".to_string(), Value::Bool(completed));
        }
        if input.is_empty() {
            return Err(ServerError::InvalidArguments(
                "at least one field to update is required".to_string(),
            ));
        }
        let query = r"mutation UpdateTodo($id: ID!, $input: TodoUpdateInput!) {
            todoUpdate(id: $id, input: $input) {
                id title completed dueDate assigneeId teamId
            }
        }";
        let resp = api
            .call(ctx, query, json!({ "id": todo_id, "input": input }))
            .await;
        Ok(reshape_node(resp, "todoUpdate"))
    }
}
