//! Chat Log - Core durability engine
//!
//! This module contains the main chat log implementation: registration
//! streams guarded by natural-key lookups, unguarded message streams, and
//! offset-based history replay for reconnecting clients.
//!
//! All mutations to a given stream are serialized under that stream's
//! lock, so offset assignment is atomic with the append and the broadcast
//! fan-out happens in append order.

mod messaging;
mod recovery;
mod registry;

use std::collections::{HashMap, HashSet};
use std::env;

use parking_lot::Mutex;

use crate::event_log::{EventLog, EventLogConfig, EventLogError};
use crate::types::{
    Event, ParticipantRole, RoomRecord, RoomRegisteredData, Stream, UserRecord, UserRegisteredData,
};

pub use recovery::StreamCursor;
pub use registry::SessionSeed;

/// Result type for chat log operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors that can occur in chat log operations
#[derive(Debug)]
pub enum ChatError {
    /// The natural key (username / roomname) is already registered;
    /// carries the existing entry's identity for the conflict message
    Conflict {
        stream: Stream,
        name: String,
        existing_offset: u64,
    },
    /// The idempotency token was already claimed in this registration
    /// stream: the logical action has been applied before
    DuplicateToken { stream: Stream, token: String },
    /// Login failed: unknown user or wrong credential
    InvalidCredential,
    /// Durable write or read failed; surfaced to the caller, not retried
    Storage(EventLogError),
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::Conflict { stream, name, .. } => {
                write!(f, "'{}' already exists in the {} stream", name, stream)
            }
            ChatError::DuplicateToken { stream, token } => {
                write!(
                    f,
                    "idempotency token '{}' was already applied to the {} stream",
                    token, stream
                )
            }
            ChatError::InvalidCredential => write!(f, "username or credential are wrong"),
            ChatError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for ChatError {}

impl From<EventLogError> for ChatError {
    fn from(e: EventLogError) -> Self {
        ChatError::Storage(e)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Storage(EventLogError::Json(e))
    }
}

/// Registration stream state: natural-key index, claimed idempotency
/// tokens, and the next offset
pub(crate) struct UserRegistry {
    pub(crate) by_name: HashMap<String, UserRecord>,
    pub(crate) tokens: HashSet<String>,
    pub(crate) next_offset: u64,
}

pub(crate) struct RoomRegistry {
    pub(crate) by_name: HashMap<String, RoomRecord>,
    pub(crate) tokens: HashSet<String>,
    pub(crate) next_offset: u64,
}

/// Message stream state: offsets only, no dedup index
pub(crate) struct MessageStream {
    pub(crate) next_offset: u64,
}

/// The chat log engine
///
/// Owns the durable [`EventLog`] plus the in-memory registries rebuilt
/// from it at startup. Each stream gets its own lock; locks are never
/// held across streams.
pub struct ChatLog {
    pub(crate) log: EventLog,
    pub(crate) users: Mutex<UserRegistry>,
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) messages: Mutex<MessageStream>,
    pub(crate) room_messages: Mutex<MessageStream>,
    pub(crate) senders: Mutex<MessageStream>,
    pub(crate) receivers: Mutex<MessageStream>,
}

impl ChatLog {
    /// Open the chat log with the data directory from `CHAT_DATA_DIR`
    /// (falling back to `./data`)
    pub fn new() -> ChatResult<Self> {
        let data_dir = env::var("CHAT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        Self::open(EventLogConfig::new(data_dir))
    }

    /// Open the chat log with a custom config, rebuilding state from disk
    pub fn open(config: EventLogConfig) -> ChatResult<Self> {
        let log = EventLog::with_config(config);

        let users = Self::load_users(&log)?;
        let rooms = Self::load_rooms(&log)?;
        let messages = MessageStream {
            next_offset: log.head_offset(Stream::Messages)? + 1,
        };
        let room_messages = MessageStream {
            next_offset: log.head_offset(Stream::RoomMessages)? + 1,
        };
        let senders = MessageStream {
            next_offset: log.head_offset(Stream::Senders)? + 1,
        };
        let receivers = MessageStream {
            next_offset: log.head_offset(Stream::Receivers)? + 1,
        };

        Ok(Self {
            log,
            users: Mutex::new(users),
            rooms: Mutex::new(rooms),
            messages: Mutex::new(messages),
            room_messages: Mutex::new(room_messages),
            senders: Mutex::new(senders),
            receivers: Mutex::new(receivers),
        })
    }

    /// Rebuild the user registry from the users stream
    fn load_users(log: &EventLog) -> ChatResult<UserRegistry> {
        let mut by_name = HashMap::new();
        let mut tokens = HashSet::new();
        let mut max_offset = 0u64;

        for event in log.load_events(Stream::Users)? {
            let data: UserRegisteredData = match event.parse_data() {
                Ok(data) => data,
                Err(e) => {
                    eprintln!(
                        "Warning: skipping unreadable users event {}: {}",
                        event.offset, e
                    );
                    continue;
                }
            };
            if data.username.is_empty() {
                continue;
            }
            max_offset = max_offset.max(event.offset);
            if !event.client_offset.is_empty() {
                tokens.insert(event.client_offset.clone());
            }
            by_name.entry(data.username.clone()).or_insert(UserRecord {
                username: data.username,
                credential: data.credential,
                offset: event.offset,
                client_offset: event.client_offset,
            });
        }

        Ok(UserRegistry {
            by_name,
            tokens,
            next_offset: max_offset + 1,
        })
    }

    /// Rebuild the room registry from the rooms stream
    fn load_rooms(log: &EventLog) -> ChatResult<RoomRegistry> {
        let mut by_name = HashMap::new();
        let mut tokens = HashSet::new();
        let mut max_offset = 0u64;

        for event in log.load_events(Stream::Rooms)? {
            let data: RoomRegisteredData = match event.parse_data() {
                Ok(data) => data,
                Err(e) => {
                    eprintln!(
                        "Warning: skipping unreadable rooms event {}: {}",
                        event.offset, e
                    );
                    continue;
                }
            };
            if data.roomname.is_empty() {
                continue;
            }
            max_offset = max_offset.max(event.offset);
            if !event.client_offset.is_empty() {
                tokens.insert(event.client_offset.clone());
            }
            by_name.entry(data.roomname.clone()).or_insert(RoomRecord {
                roomname: data.roomname,
                credential: data.credential,
                offset: event.offset,
                client_offset: event.client_offset,
            });
        }

        Ok(RoomRegistry {
            by_name,
            tokens,
            next_offset: max_offset + 1,
        })
    }

    /// Head offset per cursor-bearing stream, used to seed client cursors
    pub fn head_cursor(&self) -> StreamCursor {
        StreamCursor {
            users: self.users.lock().next_offset - 1,
            messages: self.messages.lock().next_offset - 1,
            rooms: self.rooms.lock().next_offset - 1,
            room_messages: self.room_messages.lock().next_offset - 1,
        }
    }

    /// Get the underlying event log
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }
}

// Re-export methods from submodules by implementing them here
impl ChatLog {
    // Registration operations (from registry.rs)
    pub fn register_user(
        &self,
        username: &str,
        credential: &str,
        client_offset: &str,
    ) -> ChatResult<Event> {
        registry::register_user(self, username, credential, client_offset)
    }

    pub fn authenticate(&self, username: &str, credential: &str) -> ChatResult<SessionSeed> {
        registry::authenticate(self, username, credential)
    }

    pub fn register_room(
        &self,
        roomname: &str,
        credential: &str,
        client_offset: &str,
    ) -> ChatResult<Event> {
        registry::register_room(self, roomname, credential, client_offset)
    }

    pub fn list_users(&self) -> Vec<crate::types::UserBrief> {
        registry::list_users(self)
    }

    pub fn list_rooms(&self) -> Vec<crate::types::RoomBrief> {
        registry::list_rooms(self)
    }

    pub fn get_room(&self, roomname: &str) -> Option<crate::types::RoomBrief> {
        registry::get_room(self, roomname)
    }

    // Messaging operations (from messaging.rs)
    pub fn send_direct_message(
        &self,
        client_offset: &str,
        content: &str,
        sender: &str,
        receiver: &str,
    ) -> ChatResult<Event> {
        messaging::send_direct_message(self, client_offset, content, sender, receiver)
    }

    pub fn send_room_message(
        &self,
        client_offset: &str,
        content: &str,
        sender: &str,
        receiver: &str,
    ) -> ChatResult<Event> {
        messaging::send_room_message(self, client_offset, content, sender, receiver)
    }

    pub fn note_participant(&self, role: ParticipantRole, name: &str) -> ChatResult<Event> {
        messaging::note_participant(self, role, name)
    }

    // Recovery operations (from recovery.rs)
    pub fn history_after(&self, cursor: &StreamCursor) -> ChatResult<Vec<Event>> {
        recovery::history_after(self, cursor)
    }
}
