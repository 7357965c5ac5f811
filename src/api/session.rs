//! Session management for WebSocket connections
//!
//! Each connection walks the state machine
//! Connecting → Recovering → Live → Disconnected. The cursor a session
//! carries was supplied by the client at connect time; the server never
//! remembers a cursor across connections, so a dropped session leaves
//! nothing behind.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::chat::StreamCursor;

/// Lifecycle of a connected session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket accepted, cursor received
    Connecting,
    /// Replaying history past the client's cursor; no live delivery yet
    Recovering,
    /// Replay done, receiving live broadcasts
    Live,
    /// Terminal; the session is removed from the registry
    Disconnected,
}

/// A connected client session
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub session_id: String,
    /// Set after a successful login on this session
    pub username: Option<String>,
    /// Per-stream offsets the client presented at connect time
    pub cursor: StreamCursor,
    /// Client claimed the transport already recovered it; skip replay
    pub recovered: bool,
    pub state: SessionState,
    pub connected_at: i64,
}

/// Session manager for tracking connected clients
pub struct SessionManager {
    sessions: RwLock<HashMap<String, ClientSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a new session ID
    pub fn generate_session_id() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        format!("sess_{:x}", timestamp)
    }

    /// Create a new session in the Connecting state
    pub async fn create_session(&self, cursor: StreamCursor, recovered: bool) -> ClientSession {
        let session_id = Self::generate_session_id();
        let session = ClientSession {
            session_id: session_id.clone(),
            username: None,
            cursor,
            recovered,
            state: SessionState::Connecting,
            connected_at: chrono::Utc::now().timestamp(),
        };

        self.sessions.write().await.insert(session_id, session.clone());
        session
    }

    /// Advance a session's state
    pub async fn set_state(&self, session_id: &str, state: SessionState) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.state = state;
        }
    }

    /// Attach an authenticated username to a session
    pub async fn set_username(&self, session_id: &str, username: String) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.username = Some(username);
        }
    }

    /// Remove a session (the Disconnected transition)
    pub async fn remove_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Get session by ID
    pub async fn get_session(&self, session_id: &str) -> Option<ClientSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Get active session count
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
