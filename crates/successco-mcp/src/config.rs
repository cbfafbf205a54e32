//! Boot configuration.
//!
//! All configuration is read from the environment (a `.env` file is loaded
//! by the binary before this runs). Missing required configuration is a
//! fatal startup error with a remediation message; serving requests without
//! valid configuration would produce silently wrong behavior.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::ServerError;

pub const DEFAULT_GRAPHQL_URL: &str = "https://app.success.co/graphql";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3100;

/// Which transports the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC on stdin/stdout (AI host spawns us as a child).
    Stdio,
    /// HTTP front door only (streamable + legacy SSE).
    Http,
    /// Both transports; each is an independent failure domain.
    Both,
}

impl TransportMode {
    pub fn includes_stdio(self) -> bool {
        matches!(self, TransportMode::Stdio | TransportMode::Both)
    }

    pub fn includes_http(self) -> bool {
        matches!(self, TransportMode::Http | TransportMode::Both)
    }
}

impl FromStr for TransportMode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            other => Err(ServerError::Config(format!(
                "TRANSPORT must be one of stdio, http, both (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Persisted API key for non-interactive/dev mode. Required when the
    /// stdio transport is enabled; HTTP clients may instead send a bearer
    /// token per request.
    pub api_key: Option<String>,
    pub graphql_url: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    /// Attach error detail (including upstream messages) to debug endpoints.
    pub debug_errors: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ServerError> {
        let transport = match env::var("TRANSPORT") {
            Ok(raw) => raw.parse::<TransportMode>()?,
            Err(_) => TransportMode::Stdio,
        };

        let api_key = env::var("SUCCESS_CO_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        if transport.includes_stdio() && api_key.is_none() {
            return Err(ServerError::Config(
                "SUCCESS_CO_API_KEY is not set. The stdio transport authenticates every \
                 tool call with this key; set it in the environment or a .env file \
                 (get one under Settings > API Keys in Success.co), or run with \
                 TRANSPORT=http to rely on per-request bearer tokens."
                    .to_string(),
            ));
        }

        let graphql_url =
            env::var("SUCCESS_CO_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.to_string());

        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                ServerError::Config(format!("PORT must be a number between 1 and 65535 (got '{raw}')"))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let debug_errors = env::var("DEBUG_ERRORS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let config = Self {
            api_key,
            graphql_url,
            transport,
            host,
            port,
            debug_errors,
        };

        // Validate the bind address up front so a typo fails at boot, not on
        // the first request.
        if config.transport.includes_http() {
            config.addr()?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                ServerError::Config(format!(
                    "invalid HOST/PORT combination: {}:{}",
                    self.host, self.port
                ))
            })
    }
}
