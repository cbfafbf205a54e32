//! Legacy two-endpoint SSE transport integration tests.
//!
//! Exercises the full flow: open `/sse`, read the `endpoint` event, POST
//! JSON-RPC to `/messages?sessionId=...`, and receive responses as
//! `message` events on the stream.

mod flow;
