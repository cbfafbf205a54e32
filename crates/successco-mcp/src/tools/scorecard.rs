//! Scorecard tools and date-period alignment helpers.
//!
//! Scorecard queries are windowed: the caller names a period kind and a
//! count, and the window is aligned to period boundaries (Monday for
//! weeks, the 1st for months, the quarter's first day) so values line up
//! with how Success.co buckets measurable data.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::{json, Value};

use super::{optional_str, optional_u64, require_str, reshape_list, Tool, ToolRegistry, ToolResult};
use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::graphql::GraphQlClient;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(GetMeasurables));
    registry.register(Arc::new(GetScorecard));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
    Quarterly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
        }
    }
}

impl FromStr for Period {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "quarterly" => Ok(Period::Quarterly),
            other => Err(ServerError::InvalidArguments(format!(
                "'period' must be weekly, monthly, or quarterly (got '{other}')"
            ))),
        }
    }
}

/// Snap a date back to the start of the period containing it.
pub fn align_period_start(date: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Weekly => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
        Period::Monthly => date.with_day(1).unwrap_or(date),
        Period::Quarterly => {
            let quarter_month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap_or(date)
        }
    }
}

/// Start of the window covering `periods` aligned periods ending at the
/// period that contains `end`.
pub fn window_start(end: NaiveDate, period: Period, periods: u32) -> NaiveDate {
    let mut start = align_period_start(end, period);
    for _ in 1..periods.max(1) {
        start = align_period_start(start - Duration::days(1), period);
    }
    start
}

fn parse_end_date(args: &Value) -> Result<NaiveDate, ServerError> {
    match optional_str(args, "end_date") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            ServerError::InvalidArguments(format!("'end_date' must be YYYY-MM-DD (got '{raw}')"))
        }),
        None => Ok(Utc::now().date_naive()),
    }
}

struct GetMeasurables;

#[async_trait]
impl Tool for GetMeasurables {
    fn name(&self) -> &'static str {
        "get_measurables"
    }

    fn description(&self) -> &'static str {
        "List measurable definitions (name, goal, unit, owner), filterable by team."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "limit": { "type": "integer", "description": "Maximum measurables to return (default 50, max 200)" }
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
        let query = r"query Measurables($first: Int, $teamId: ID) {
            measurables(first: $first, teamId: $teamId) {
                id name goal goalOperator unit ownerId teamId period
            }
        }";
        let variables = json!({
            "first": optional_u64(&args, "limit").unwrap_or(50).min(200),
            "teamId": optional_str(&args, "team_id"),
        });
        let resp = api.call(ctx, query, variables).await;
        Ok(reshape_list(resp, "measurables"))
    }
}

struct GetScorecard;

#[async_trait]
impl Tool for GetScorecard {
    fn name(&self) -> &'static str {
        "get_scorecard"
    }

    fn description(&self) -> &'static str {
        "Fetch a team's scorecard values over an aligned window of weekly, monthly, or quarterly periods."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "team_id": { "type": "string" },
                "period": { "type": "string", "enum": ["weekly", "monthly", "quarterly"], "description": "Defaults to weekly" },
                "periods": { "type": "integer", "description": "How many periods back to include (default 12, max 52)" },
                "end_date": { "type": "string", "description": "Window end, YYYY-MM-DD; defaults to today" }
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
        let period = match optional_str(&args, "period") {
            Some(raw) => raw.parse::<Period>()?,
            None => Period::Weekly,
        };
        let periods = optional_u64(&args, "periods").unwrap_or(12).clamp(1, 52) as u32;
        let end = parse_end_date(&args)?;
        let from = window_start(end, period, periods);

        let query = r"query Scorecard($teamId: ID!, $from: Date!, $to: Date!) {
            scorecard(teamId: $teamId, from: $from, to: $to) {
                measurableId name goal unit
                values { date value onTrack }
            }
        }";
        let variables = json!({
            "teamId": team_id,
            "from": from.format("%Y-%m-%d").to_string(),
            "to": end.format("%Y-%m-%d").to_string(),
        });
        let resp = api.call(ctx, query, variables).await;

        // Attach the computed window so the caller can line values up
        // without re-deriving the alignment.
        let mut result = reshape_list(resp, "scorecard");
        if let Some(first) = result.content.first_mut() {
            if let Ok(mut payload) = serde_json::from_str::<Value>(&first.text) {
                if let Some(map) = payload.as_object_mut() {
                    map.insert("period".to_string(), json!(period.as_str()));
                    map.insert("from".to_string(), json!(from.format("%Y-%m-%d").to_string()));
                    map.insert("to".to_string(), json!(end.format("%Y-%m-%d").to_string()));
                }
                *first = ToolResult::json(&payload).content.remove(0);
            }
        }
        Ok(result)
    }
}
