//! Legacy two-endpoint SSE transport: GET `/sse` + POST `/messages`.
//!
//! The stream's first event is `endpoint`, telling the client where to
//! POST its messages (with the session id baked into the query string).
//! Responses do not come back on the POST; they are pushed to the stream
//! as `message` events. Kept for older MCP clients; new integrations use
//! the streamable transport on `/mcp`.

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
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
use crate::session::{Session, SessionEvent, TransportKind};

/// Open an SSE session. The session lives exactly as long as the stream:
/// when the client disconnects, a watcher task removes it from the
/// manager, so `/messages` cannot address a dead stream for long.
pub async fn get_sse(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = guidance::require_sse_accept(&headers, guidance::EXAMPLE_SSE) {
        return resp;
    }

    let server = McpServer::new(state.registry.clone(), state.api.clone());
    let session = Session::new(TransportKind::Sse, server);
    let session_id = session.id.clone();

    let (tx, mut rx) = mpsc::channel(32);
    session.attach_stream(tx.clone()).await;
    state.sessions.add(session).await;
    info!(session_id = %session_id, "sse session opened");

    // The Sender's closed() future resolves once the stream below is
    // dropped, which is how we observe the client going away.
    let sessions = state.sessions.clone();
    let watched_id = session_id.clone();
    tokio::spawn(async move {
        tx.closed().await;
        sessions.remove(TransportKind::Sse, &watched_id).await;
    });

    let endpoint = format!("/messages?sessionId={session_id}");
    let stream = async_stream::stream! {
        yield Ok::<Event, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(event) = rx.recv().await {
            yield Ok::<Event, Infallible>(Event::default().event(event.event).data(event.data));
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(30)))
        .into_response()
}

#[derive(Deserialize)]
pub struct MessagesQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

fn session_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "jsonrpc": "2.0",
            "error": { "code": codes::SESSION_NOT_FOUND, "message": message },
            "id": null,
        })),
    )
        .into_response()
}

/// Inbound half of the legacy transport. The POST acknowledges receipt;
/// the JSON-RPC response travels over the session's event stream.
pub async fn post_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    if let Err(resp) = guidance::require_json_post(&headers, guidance::EXAMPLE_MESSAGES) {
        return resp;
    }

    let Some(session_id) = query.session_id else {
        return guidance::transport_mismatch(
            "Missing sessionId query parameter",
            json!({ "sessionId": null }),
            json!({ "sessionId": "<id from the endpoint event on /sse>" }),
            guidance::EXAMPLE_MESSAGES,
        );
    };

    let Some(session) = state.sessions.get(TransportKind::Sse, &session_id).await else {
        warn!(session_id = %session_id, "message for unknown sse session");
        return session_error("No transport found for sessionId");
    };

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            let resp = JsonRpcResponse::error(Value::Null, RpcError::parse_error(e.to_string()));
            return (StatusCode::BAD_REQUEST, Json(resp)).into_response();
        }
    };

    let ctx = AuthContext::from_headers(&headers, &state.config);
    if let Some(response) = session.server.handle(request, &ctx).await {
        match serde_json::to_string(&response) {
            Ok(payload) => {
                if !session.send(SessionEvent::message(payload)).await {
                    warn!(session_id = %session.id, "response undelivered: sse stream closed");
                }
            }
            Err(e) => warn!(session_id = %session.id, "failed to serialize response: {e}"),
        }
    }

    Json(json!({ "ok": true })).into_response()
}
