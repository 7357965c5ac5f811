//! Chat Relay Server
//!
//! A minimal real-time chat server built around a durable replay protocol:
//! every event is appended to a per-stream log with a monotonic offset, and
//! a reconnecting client replays exactly the events it missed before going
//! live.
//!
//! # Features
//!
//! - **Per-Stream Event Logs**: users, messages, rooms, room messages and
//!   two auxiliary participant logs, each append-only JSONL
//! - **Idempotent Registration**: natural-key guard for usernames and rooms
//! - **Offset Replay**: reconnect with a cursor, receive only what you missed
//! - **Live Broadcast**: fan-out to every connected WebSocket session in
//!   append order
//! - **REST Read API**: recovery and data access endpoints
//!
//! # Modules
//!
//! - `types`: Core data structures (Event, Stream, records)
//! - `event_log`: Durable append-only storage
//! - `chat`: Chat log engine with registration, messaging and recovery
//! - `api`: WebSocket and REST endpoints
//! - `utils`: Utility functions (timestamps, etc.)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_relay::api::http::create_router;
//! use chat_relay::api::websocket::state::AppState;
//! use chat_relay::chat::ChatLog;
//!
//! #[tokio::main]
//! async fn main() {
//!     let chat = Arc::new(ChatLog::new().expect("open chat log"));
//!     let state = Arc::new(AppState::new(chat));
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod api;
pub mod chat;
pub mod event_log;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use chat::{ChatError, ChatLog, ChatResult, SessionSeed, StreamCursor};
pub use event_log::{EventLog, EventLogConfig, EventLogError, EventLogResult};
pub use types::{Event, EventKind, ParticipantRole, Stream};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
