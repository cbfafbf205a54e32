//! Vision/Traction Organizer (VTO) tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{optional_str, reshape_list, reshape_node, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetVision));
    registry.register(Arc::new(GetCoreValues));
}

struct GetVision;

#[async_trait]
impl Tool for GetVision {
    fn name(&self) -> &'static str {
        "get_vision"
    }

    fn description(&self) -> &'static str {
        "Fetch the company's Vision/Traction Organizer: core focus, ten-year target, marketing strategy, and three-year picture."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string", "description": "Team-level vision; omit for the company vision" }
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
        let query = r"query Vision($teamId: ID) {
            vision(teamId: $teamId) {
                id coreFocus tenYearTarget marketingStrategy
                threeYearPicture { futureDate revenue profit measurables }
                oneYearPlan { futureDate revenue profit goals }
            }
        }";
        let variables = json!({ "teamId": optional_str(&args, "team_id") });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_node(resp, "vision"))
    }
}

struct GetCoreValues;

#[async_trait]
impl Tool for GetCoreValues {
    fn name(&self) -> &'static str {
        "get_core_values"
    }

    fn description(&self) -> &'static str {
        "List the company's core values."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn call(
        &self,
        api: &GraphQlClient,
        _args: Value,
        ctx: &AuthContext,
    ) -> Result<ToolResult, ServerError> {
        let query = r"query CoreValues {
            coreValues { id name description position }
        }";
        let resp = api.call(ctx, query, json!({})).await;
        Ok(reshape_list(resp, "coreValues"))
    }
}
