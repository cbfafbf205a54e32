//! MCP adapter for the Success.co GraphQL API.
//!
//! Exposes EOS workflows (teams, rocks, todos, issues, scorecard, vision)
//! as MCP tools over three transports: stdio for spawned child-process
//! use, streamable HTTP on `/mcp`, and the legacy SSE pair on
//! `/sse` + `/messages`. One protocol dispatch path serves all three.

pub mod auth;
pub mod config;
pub mod error;
pub mod graphql;
pub mod http;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

pub use auth::AuthContext;
pub use config::Config;
pub use error::{Result, ServerError};
pub use graphql::GraphQlClient;
pub use server::McpServer;
pub use session::SessionManager;
pub use tools::ToolRegistry;
