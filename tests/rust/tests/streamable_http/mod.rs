//! Streamable HTTP transport integration tests.
//!
//! Covers the session lifecycle on `/mcp` (initialize, repeat initialize,
//! teardown), misrouting guidance, and credential isolation between
//! concurrent requests on one session.

mod guidance;
mod sessions;
