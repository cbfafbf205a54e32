//! In-memory registry of live transport sessions.
//!
//! The manager is a pure keyed store: no authentication, no validation.
//! The streamable and legacy SSE transports keep disjoint id partitions so
//! an id collision across transport kinds cannot cause cross-talk. `get`
//! on an unknown id returns `None`; callers translate that into a
//! protocol-level "no valid session" error.
//!
//! Requests within one session are not queued or ordered; handlers with
//! varying latency may complete out of arrival order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::server::McpServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Streamable,
    Sse,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Streamable => write!(f, "streamable"),
            TransportKind::Sse => write!(f, "sse"),
        }
    }
}

/// One event pushed to a session's open stream.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub event: String,
    pub data: String,
}

impl SessionEvent {
    pub fn message(data: String) -> Self {
        Self {
            event: "message".to_string(),
            data,
        }
    }
}

/// A live transport session: an immutable binding between a generated id,
/// one dedicated protocol-server instance, and (when open) the connection's
/// event stream. Identity is NOT part of a session; each request resolves
/// its own `AuthContext`.
pub struct Session {
    pub id: String,
    pub kind: TransportKind,
    pub server: McpServer,
    pub created_at: DateTime<Utc>,
    event_tx: Mutex<Option<mpsc::Sender<SessionEvent>>>,
}

impl Session {
    pub fn new(kind: TransportKind, server: McpServer) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            kind,
            server,
            created_at: Utc::now(),
            event_tx: Mutex::new(None),
        })
    }

    /// Bind the open connection's event channel to this session.
    pub async fn attach_stream(&self, tx: mpsc::Sender<SessionEvent>) {
        let mut guard = self.event_tx.lock().await;
        *guard = Some(tx);
    }

    /// Push an event to the session's stream. Returns false when no stream
    /// is attached or the peer already disconnected; a dead connection is
    /// not an error here, the caller decides whether it matters.
    pub async fn send(&self, event: SessionEvent) -> bool {
        let guard = self.event_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => match tx.send(event).await {
                Ok(()) => true,
                Err(_) => {
                    debug!(session_id = %self.id, kind = %self.kind, "event dropped: stream closed");
                    false
                }
            },
            None => false,
        }
    }
}

/// Keyed store of live sessions, partitioned by transport kind.
#[derive(Default)]
pub struct SessionManager {
    streamable: RwLock<HashMap<String, Arc<Session>>>,
    sse: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, kind: TransportKind) -> &RwLock<HashMap<String, Arc<Session>>> {
        match kind {
            TransportKind::Streamable => &self.streamable,
            TransportKind::Sse => &self.sse,
        }
    }

    pub async fn add(&self, session: Arc<Session>) {
        info!(
            session_id = %session.id,
            kind = %session.kind,
            "session registered"
        );
        self.partition(session.kind)
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    pub async fn get(&self, kind: TransportKind, id: &str) -> Option<Arc<Session>> {
        self.partition(kind).read().await.get(id).cloned()
    }

    pub async fn remove(&self, kind: TransportKind, id: &str) -> Option<Arc<Session>> {
        let removed = self.partition(kind).write().await.remove(id);
        if let Some(session) = &removed {
            info!(
                session_id = %session.id,
                kind = %session.kind,
                duration_s = (Utc::now() - session.created_at).num_seconds(),
                "session removed"
            );
        }
        removed
    }

    pub async fn count(&self, kind: TransportKind) -> usize {
        self.partition(kind).read().await.len()
    }
}
