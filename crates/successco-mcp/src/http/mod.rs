//! HTTP front door.
//!
//! Exposes the streamable transport on `/mcp`, the legacy two-endpoint SSE
//! transport on `/sse` + `/messages`, and a health probe reporting live
//! session counts. Requests whose shape does not match the endpoint are
//! rejected up front with corrective guidance (see `guidance`).

pub mod guidance;
pub mod sse;
pub mod streamable;

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::config::Config;
use crate::graphql::GraphQlClient;
use crate::session::{SessionManager, TransportKind};
use crate::tools::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub registry: Arc<ToolRegistry>,
    pub api: Arc<GraphQlClient>,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/mcp",
            axum::routing::post(streamable::post_mcp)
                .get(streamable::get_mcp)
                .delete(streamable::delete_mcp),
        )
        .route("/sse", get(sse::get_sse))
        .route("/messages", axum::routing::post(sse::post_messages))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    transports: TransportCounts,
    timestamp: String,
    /// Only present with DEBUG_ERRORS=1.
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream: Option<String>,
}

#[derive(Serialize)]
struct TransportCounts {
    streamable: usize,
    sse: usize,
}

/// Liveness plus live session counts per transport partition.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        transports: TransportCounts {
            streamable: state.sessions.count(TransportKind::Streamable).await,
            sse: state.sessions.count(TransportKind::Sse).await,
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
        upstream: state
            .config
            .debug_errors
            .then(|| state.api.endpoint().to_string()),
    })
}
