//! Streamable HTTP transport: POST/GET/DELETE on `/mcp`.
//!
//! Sessions are created only by a valid `initialize` request; every other
//! message must carry the `mcp-session-id` header issued in the initialize
//! response. GET opens the session's server-push event stream, DELETE
//! tears the session down.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::guidance;
use super::AppState;
use crate::auth::AuthContext;
use crate::protocol::{codes, JsonRpcRequest, JsonRpcResponse, RpcError};
use crate::server::McpServer;
use crate::session::{Session, TransportKind};

pub const SESSION_HEADER: &str = "mcp-session-id";

fn session_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "jsonrpc": "2.0",
            "error": { "code": codes::SESSION_NOT_FOUND, "message": message },
            "id": null,
        })),
    )
        .into_response()
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn rpc_response(response: Option<JsonRpcResponse>) -> Response {
    match response {
        Some(resp) => Json(resp).into_response(),
        // Notifications are accepted with an empty 202.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// JSON-RPC over POST. `initialize` without a known session id mints a new
/// session and returns its id in the `mcp-session-id` response header; any
/// other method without a valid id is refused without creating state.
pub async fn post_mcp(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(resp) = guidance::require_json_post(&headers, guidance::EXAMPLE_INITIALIZE) {
        return resp;
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            let resp = JsonRpcResponse::error(Value::Null, RpcError::parse_error(e.to_string()));
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
    };

    let ctx = AuthContext::from_headers(&headers, &state.config);

    if let Some(id) = session_id(&headers) {
        if let Some(session) = state.sessions.get(TransportKind::Streamable, &id).await {
            // A repeat initialize on an existing session re-runs the
            // handshake without minting a second session.
            let response = session.server.handle(request, &ctx).await;
            return ([(SESSION_HEADER, session.id.clone())], rpc_response(response)).into_response();
        }
        warn!(session_id = %id, "request for unknown streamable session");
        return session_error(
            StatusCode::BAD_REQUEST,
            "Bad Request: No valid session ID provided",
        );
    }

    if request.method != "initialize" {
        return session_error(
            StatusCode::BAD_REQUEST,
            "Bad Request: No valid session ID provided",
        );
    }

    let server = McpServer::new(state.registry.clone(), state.api.clone());
    let session = Session::new(TransportKind::Streamable, server);
    let response = session.server.handle(request, &ctx).await;
    let session_id = session.id.clone();
    state.sessions.add(session).await;
    info!(session_id = %session_id, "streamable session initialized");

    ([(SESSION_HEADER, session_id)], rpc_response(response)).into_response()
}

/// Open the session's server-push SSE stream. The stream stays silent
/// until the server has something to push; keep-alives hold it open.
pub async fn get_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = guidance::require_sse_accept(&headers, guidance::EXAMPLE_SSE) {
        return resp;
    }

    let Some(id) = session_id(&headers) else {
        return session_error(
            StatusCode::BAD_REQUEST,
            "Bad Request: No valid session ID provided",
        );
    };
    let Some(session) = state.sessions.get(TransportKind::Streamable, &id).await else {
        return session_error(StatusCode::BAD_REQUEST, "Session not found");
    };

    let (tx, mut rx) = mpsc::channel(32);
    session.attach_stream(tx).await;
    info!(session_id = %session.id, "streamable event stream opened");

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok::<Event, Infallible>(Event::default().event(event.event).data(event.data));
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(30)))
        .into_response()
}

/// Explicit session teardown.
pub async fn delete_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return session_error(
            StatusCode::BAD_REQUEST,
            "Bad Request: No valid session ID provided",
        );
    };

    match state.sessions.remove(TransportKind::Streamable, &id).await {
        Some(_) => Json(json!({ "ok": true })).into_response(),
        None => session_error(StatusCode::BAD_REQUEST, "Session not found"),
    }
}
