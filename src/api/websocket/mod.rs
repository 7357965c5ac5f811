//! WebSocket module for real-time chat delivery
//!
//! Provides the WebSocket endpoint at `/ws`: history replay on connect,
//! then live broadcast of every appended event.
//!
//! ## Features
//! - Per-stream offset cursors for reconnect replay
//! - Subscribe-then-replay ordering (at-least-once across the boundary)
//! - Lag notice when a slow client misses broadcast events

pub mod broadcaster;
pub mod events;
pub mod handler;
pub mod state;

// Re-export commonly used items
pub use broadcaster::{broadcast_event, get_broadcaster, init_broadcaster, helpers as ws_helpers};
