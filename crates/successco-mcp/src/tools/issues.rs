//! Issue tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

const ISSUE_STATUSES: &[&str] = &["OPEN", "SOLVED", "ARCHIVED"];

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetIssues));
    registry.register(Arc::new(CreateIssue));
    registry.register(Arc::new(UpdateIssue));
}

struct GetIssues;

#[async_trait]
impl Tool for GetIssues {
    fn name(&self) -> &'static str {
        "get_issues"
    }

    fn description(&self) -> &'static str {
        "List issues, filterable by team and status."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "status": { "type": "string", "enum": ISSUE_STATUSES },
                "limit": { "type": "integer", "description": "Maximum issues to return (default 50, max 200)" }
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
        if let Some(status) = optional_str(&args, "status") {
            if !ISSUE_STATUSES.contains(&status.as_str()) {
                return Err(ServerError::InvalidArguments(format!(
                    "'status' must be one of {} (got '{status}')",
                    ISSUE_STATUSES.join(", ")
                )));
            }
        }
        let query = r"query Issues($first: Int, $teamId: ID, $status: IssueStatus) {
            issues(first: $first, teamId: $teamId, status: $status) {
                id title description status priority teamId raisedById createdAt
            }
        }";
        let variables = json!({
            "first": optional_u64(&args, "limit").unwrap_or(50).min(200),
            "teamId": optional_str(&args, "team_id"),
            "status": optional_str(&args, "status"),
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "issues"))
    }
}

struct CreateIssue;

#[async_trait]
impl Tool for CreateIssue {
    fn name(&self) -> &'static str {
        "create_issue"
    }

    fn description(&self) -> &'static str {
        "Raise an issue for a team's issues list."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "description": { "type": "string" },
                "team_id": { "type": "string" },
                "priority": { "type": "integer", "description": "1 (highest) to 5" }
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
        if let Some(v) = optional_str(&args, "description") {
            input.insert("description".to_string(), Value::String(v));
        }
        if let Some(v) = optional_str(&args, "team_id") {
            input.insert("teamId".to_string(), Value::String(v));
        }
        if let Some(priority) = optional_u64(&args, "priority") {
            if !(1..=5).contains(&priority) {
                return Err(ServerError::InvalidArguments(
                    "'priority' must be between 1 and 5".to_string(),
                ));
            }
            input.insert("priority".to_string(), json!(priority));
        }
        let query = r"mutation CreateIssue($input: IssueCreateInput!) {
            issueCreate(input: $input) {
                id title description status priority teamId
            }
        }";
        let resp = api.call(ctx, query, json!({ "input": input })).await;
        Ok(reshape_node(resp, "issueCreate"))
    }
}

struct UpdateIssue;

#[async_trait]
impl Tool for UpdateIssue {
    fn name(&self) -> &'static str {
        "update_issue"
    }

    fn description(&self) -> &'static str {
        "Update an issue's title, description, status, or priority."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_id": { "type": "string" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "status": { "type": "string", "enum": ISSUE_STATUSES },
                "priority": { "type": "integer" }
            },
            "required": ["issue_id"],
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
        let issue_id = require_str(&args, "issue_id")?;
        let mut input = Map::new();
        for (arg, field) in [
            ("title", "title"),
            ("description", "description"),
            ("status", "status"),
        ] {
            if let Some(v) = optional_str(&args, arg) {
                if arg == "status" && !ISSUE_STATUSES.contains(&v.as_str()) {
                    return Err(ServerError::InvalidArguments(format!(
                        "'status' must be one of {} (got '{v}')",
                        ISSUE_STATUSES.join(", ")
                    )));
                }
                input.insert(field.to_string(), Value::String(v));
            }
        }
        if let Some(priority) = optional_u64(&args, "priority") {
            input.insert("priority".to_string(), json!(priority));
        }
        if input.is_empty() {
            return Err(ServerError::InvalidArguments(
                "at least one field to update is required".to_string(),
            ));
        }
        let query = r"mutation UpdateIssue($id: ID!, $input: IssueUpdateInput!) {
            issueUpdate(id: $id, input: $input) {
                id title description status priority teamId
            }
        }";
        let resp = api
            .call(ctx, query, json!({ "id": issue_id, "input": input }))
            .await;
        Ok(reshape_node(resp, "issueUpdate"))
    }
}
