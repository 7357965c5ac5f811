//! WebSocket event broadcaster
//!
//! This module provides a global event broadcaster that the chat log's
//! mutation operations use to notify connected sessions of appended
//! events.
//!
//! # Design
//!
//! Instead of handing the ChatLog a reference to every live connection,
//! we use a separate broadcaster that is initialized once when the HTTP
//! server starts. Operations call it while still holding their stream's
//! lock, so fan-out order always equals log order. Delivery is
//! fire-and-forget: a session that is mid-disconnect misses the event
//! and recovers it from its cursor on the next connect.

use std::sync::OnceLock;
use tokio::sync::broadcast;

use super::events::{ServerEvent, WsMessage};

/// Global broadcaster instance (initialized once when HTTP server starts)
static BROADCASTER: OnceLock<EventBroadcaster> = OnceLock::new();

/// Event broadcaster for WebSocket notifications
pub struct EventBroadcaster {
    tx: broadcast::Sender<WsMessage>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with the given capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Broadcast an event to all connected WebSocket clients
    pub fn broadcast(&self, event: ServerEvent) {
        let msg = WsMessage {
            event,
            timestamp: chrono::Utc::now().timestamp(),
        };
        // Ignore errors - just means no receivers are connected
        let _ = self.tx.send(msg);
    }

    /// Subscribe to receive broadcast events
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }

    /// Get the sender for cloning into state
    pub fn sender(&self) -> broadcast::Sender<WsMessage> {
        self.tx.clone()
    }
}

/// Initialize the global broadcaster (call once when HTTP server starts)
pub fn init_broadcaster(capacity: usize) -> &'static EventBroadcaster {
    BROADCASTER.get_or_init(|| EventBroadcaster::new(capacity))
}

/// Get the global broadcaster (returns None if not initialized)
pub fn get_broadcaster() -> Option<&'static EventBroadcaster> {
    BROADCASTER.get()
}

/// Broadcast an event if the broadcaster is initialized
/// This is the main entry point for chat log operations
pub fn broadcast_event(event: ServerEvent) {
    if let Some(broadcaster) = BROADCASTER.get() {
        broadcaster.broadcast(event);
    }
}

/// Helper functions for common events
pub mod helpers {
    use super::*;
    use crate::types::ParticipantRole;

    /// Broadcast a user registration
    pub fn user_registered(offset: u64, username: &str) {
        broadcast_event(ServerEvent::UserRegistered {
            offset,
            username: username.to_string(),
        });
    }

    /// Broadcast a one-on-one message
    pub fn direct_message(offset: u64, content: &str, sender: &str, receiver: &str) {
        broadcast_event(ServerEvent::DirectMessage {
            offset,
            content: content.to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
        });
    }

    /// Broadcast a room registration
    pub fn room_registered(offset: u64, roomname: &str) {
        broadcast_event(ServerEvent::RoomRegistered {
            offset,
            roomname: roomname.to_string(),
        });
    }

    /// Broadcast a room message
    pub fn room_message(offset: u64, content: &str, sender: &str, receiver: &str) {
        broadcast_event(ServerEvent::RoomMessage {
            offset,
            content: content.to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
        });
    }

    /// Broadcast an observed participant name
    pub fn participant_noted(role: ParticipantRole, name: &str) {
        broadcast_event(ServerEvent::ParticipantNoted {
            role,
            name: name.to_string(),
        });
    }
}
