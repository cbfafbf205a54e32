//! Error types for the server library.

use thiserror::Error;

/// Errors produced by the server core and the tool collection.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or malformed startup configuration. Fatal at boot.
    #[error("configuration error: {0}")]
    Config(String),

    /// The upstream GraphQL endpoint could not be reached.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// A tool rejected its arguments during validation.
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// `tools/call` named a tool the registry does not know.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
