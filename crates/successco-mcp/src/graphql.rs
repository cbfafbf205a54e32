//! Remote API client for the Success.co GraphQL endpoint.
//!
//! Every call authenticates from the caller's `AuthContext` and returns an
//! `ApiResponse` rather than an error: upstream failures are data the tool
//! layer reshapes into error-shaped content, never exceptions that cross
//! the dispatch boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::{AuthContext, Credential};
use crate::error::ServerError;

/// Bound on upstream latency. A hung GraphQL call must not hang the tool
/// call indefinitely.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the persisted API key in non-interactive mode.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(endpoint: String) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one GraphQL operation as the given caller.
    pub async fn call(&self, ctx: &AuthContext, query: &str, variables: Value) -> ApiResponse {
        let Some(credential) = &ctx.credential else {
            return ApiResponse::failure(
                "No credentials available: send an Authorization bearer token or set SUCCESS_CO_API_KEY",
            );
        };

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));

        request = match credential {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::ApiKey(key) => request.header(API_KEY_HEADER, key),
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(endpoint = %self.endpoint, "GraphQL call timed out");
                return ApiResponse::failure(format!(
                    "Success.co API timed out after {}s",
                    UPSTREAM_TIMEOUT.as_secs()
                ));
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, "GraphQL call failed: {e}");
                return ApiResponse::failure(format!("Success.co API unreachable: {e}"));
            }
        };

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                return ApiResponse::failure(format!(
                    "Success.co API returned a non-JSON body (status {status}): {e}"
                ));
            }
        };

        // GraphQL errors come back with status 200; check both layers.
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let messages: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect();
                let joined = if messages.is_empty() {
                    errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; ")
                } else {
                    messages.join("; ")
                };
                debug!(endpoint = %self.endpoint, "GraphQL errors: {joined}");
                return ApiResponse::failure(joined);
            }
        }

        if !status.is_success() {
            return ApiResponse::failure(format!("Success.co API returned status {status}"));
        }

        ApiResponse::success(body.get("data").cloned().unwrap_or(Value::Null))
    }
}
