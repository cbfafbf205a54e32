//! Transport-misrouting guidance.
//!
//! MCP client ecosystems have historically confused the streamable and
//! legacy SSE endpoints. Instead of letting a misshapen request fall
//! through to transport code (where it would hang or crash), each handler
//! validates the method/header combination first and answers with a 400
//! naming the current shape, the expected shape, and a worked example.

use axum::response::{IntoResponse, Json, Response};
use http::{HeaderMap, Method, StatusCode};
use serde_json::{json, Value};

use crate::protocol::codes;

pub const EXAMPLE_INITIALIZE: &str = concat!(
    "curl -X POST http://localhost:3100/mcp ",
    "-H 'Content-Type: application/json' ",
    r#"-d '{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"curl","version":"0"}}}'"#,
);

pub const EXAMPLE_SSE: &str = "curl -N -H 'Accept: text/event-stream' http://localhost:3100/sse";

pub const EXAMPLE_MESSAGES: &str = concat!(
    "curl -X POST 'http://localhost:3100/messages?sessionId=<id from the endpoint event>' ",
    "-H 'Content-Type: application/json' ",
    r#"-d '{"jsonrpc":"2.0","id":1,"method":"tools/list"}'"#,
);

/// What the client appears to be attempting, judged by method + headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// POST carrying JSON: a JSON-RPC message.
    JsonRpc,
    /// GET asking for text/event-stream: opening an event stream.
    SseStream,
    /// DELETE: session teardown.
    SessionControl,
    Ambiguous,
}

pub fn classify(method: &Method, headers: &HeaderMap) -> Intent {
    if *method == Method::POST && content_type_is_json(headers) {
        Intent::JsonRpc
    } else if *method == Method::GET && accepts_event_stream(headers) {
        Intent::SseStream
    } else if *method == Method::DELETE {
        Intent::SessionControl
    } else {
        Intent::Ambiguous
    }
}

pub fn content_type_is_json(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("application/json"))
}

pub fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/event-stream"))
}

fn header_value(headers: &HeaderMap, name: http::header::HeaderName) -> Value {
    match headers.get(&name).and_then(|v| v.to_str().ok()) {
        Some(v) => json!(v),
        None => Value::Null,
    }
}

/// Structured 400 carrying the corrective guidance object.
pub fn transport_mismatch(
    message: &str,
    current: Value,
    expected: Value,
    example: &str,
) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "jsonrpc": "2.0",
            "error": { "code": codes::INVALID_REQUEST, "message": message },
            "id": null,
            "guidance": {
                "current": current,
                "expected": expected,
                "example": example,
            },
        })),
    )
        .into_response()
}

/// JSON-RPC POST endpoints require `Content-Type: application/json`.
pub fn require_json_post(headers: &HeaderMap, example: &str) -> Result<(), Response> {
    if classify(&Method::POST, headers) == Intent::JsonRpc {
        return Ok(());
    }
    Err(transport_mismatch(
        "This endpoint accepts JSON-RPC messages; the request body must be JSON",
        json!({ "content-type": header_value(headers, http::header::CONTENT_TYPE) }),
        json!({ "content-type": "application/json" }),
        example,
    ))
}

/// SSE endpoints require `Accept: text/event-stream`.
pub fn require_sse_accept(headers: &HeaderMap, example: &str) -> Result<(), Response> {
    if classify(&Method::GET, headers) == Intent::SseStream {
        return Ok(());
    }
    Err(transport_mismatch(
        "This endpoint opens a server-sent event stream; the request must accept text/event-stream",
        json!({ "accept": header_value(headers, http::header::ACCEPT) }),
        json!({ "accept": "text/event-stream" }),
        example,
    ))
}
