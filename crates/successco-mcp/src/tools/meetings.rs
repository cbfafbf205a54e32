//! Meeting tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetMeetings));
    registry.register(Arc::new(GetMeetingAgenda));
}

struct GetMeetings;

#[async_trait]
impl Tool for GetMeetings {
    fn name(&self) -> &'static str {
        "get_meetings"
    }

    fn description(&self) -> &'static str {
        "List meetings (Level 10s and others), filterable by team."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "limit": { "type": "integer", "description": "Maximum meetings to return (default 50, max 200)" }
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
        let query = r"query Meetings($first: Int, $teamId: ID) {
            meetings(first: $first, teamId: $teamId) {
                id name teamId dayOfWeek startTime durationMinutes
            }
        }";
        let variables = json!({
            "first": optional_u64(&args, "limit").unwrap_or(50).min(200),
            "teamId": optional_str(&args, "team_id"),
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "meetings"))
    }
}

struct GetMeetingAgenda;

#[async_trait]
impl Tool for GetMeetingAgenda {
    fn name(&self) -> &'static str {
        "get_meeting_agenda"
    }

    fn description(&self) -> &'static str {
        "Fetch one meeting's agenda sections and their time allocations."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "meeting_id": { "type": "string" }
            },
            "required": ["meeting_id"],
            "additionalProperties": false
        })
    }

    async fn call(
        &self,
        api: &GraphQlClient,
        args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let meeting_id = require_str(&args, "meeting_id")?;
        let query = r"query MeetingAgenda($id: ID!) {
            meeting(id: $id) {
                id name
                agenda { position title minutes }
            }
        }";
        let resp = api.call(ctx, query, json!({ "id": meeting_id })).await;
        Ok(reshape_node(resp, "meeting"))
    }
}
