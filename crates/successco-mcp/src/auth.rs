//! Per-request caller identity.
//!
//! An `AuthContext` is constructed from the inbound request (or from boot
//! configuration on the stdio path) and threaded explicitly through every
//! tool handler signature. It is never stored in task-local or global
//! state, and never attached to a `Session`: a session is transport
//! plumbing, and may see different identities on different requests behind
//! a shared proxy. Explicit threading makes cross-request context leakage
//! unrepresentable, which matters because concurrent tool calls interleave
//! on the same runtime.

use http::HeaderMap;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Environment/file-resolved key, used in non-interactive/dev mode.
    ApiKey(String),
    /// OAuth access token from the request's Authorization header.
    Bearer(String),
}

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub credential: Option<Credential>,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub user_email: Option<String>,
    pub client: Option<String>,
    pub client_version: Option<String>,
}

impl AuthContext {
    /// Identity for the stdio transport: always the configured API key.
    pub fn from_config(config: &Config) -> Self {
        Self {
            credential: config.api_key.clone().map(Credential::ApiKey),
            ..Self::default()
        }
    }

    /// Identity for one HTTP request. A bearer token wins over the
    /// configured API key; identity hints from a fronting proxy are
    /// carried through untouched (the upstream verifies them).
    pub fn from_headers(headers: &HeaderMap, config: &Config) -> Self {
        let bearer = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string());

        let credential = match bearer {
            Some(token) => Some(Credential::Bearer(token)),
            None => config.api_key.clone().map(Credential::ApiKey),
        };

        Self {
            credential,
            user_id: header_string(headers, "x-successco-user-id"),
            company_id: header_string(headers, "x-successco-company-id"),
            user_email: header_string(headers, "x-successco-user-email"),
            client: header_string(headers, "x-mcp-client"),
            client_version: header_string(headers, "x-mcp-client-version"),
        }
    }

    pub fn is_api_key_mode(&self) -> bool {
        matches!(self.credential, Some(Credential::ApiKey(_)))
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
