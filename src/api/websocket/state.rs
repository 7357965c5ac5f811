//! WebSocket application state

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::session::SessionManager;
use crate::chat::ChatLog;

use super::broadcaster::init_broadcaster;
use super::events::WsMessage;

/// Buffer 1024 events - if clients are too slow, they'll miss events
/// and need to reconnect with their cursor
const BROADCAST_CAPACITY: usize = 1024;

/// Shared application state for WebSocket connections
pub struct AppState {
    /// The chat log engine
    pub chat: Arc<ChatLog>,

    /// Connected session registry
    pub sessions: SessionManager,

    /// Broadcast channel for sending events to all connected clients;
    /// shares the channel of the global broadcaster the chat ops publish to
    pub event_tx: broadcast::Sender<WsMessage>,
}

impl AppState {
    /// Create a new AppState around the given chat log
    pub fn new(chat: Arc<ChatLog>) -> Self {
        let event_tx = init_broadcaster(BROADCAST_CAPACITY).sender();

        Self {
            chat,
            sessions: SessionManager::new(),
            event_tx,
        }
    }

    /// Subscribe to receive broadcast events
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.event_tx.subscribe()
    }
}
