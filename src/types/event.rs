//! Event types for the durable chat log
//!
//! This module defines the core event types used for the append-only stream logs.
//! Events are immutable records; a client's view of the world is rebuilt by
//! replaying the events it has not yet seen, identified by per-stream offsets.

use serde::{Deserialize, Serialize};

use super::participant::ParticipantRole;

/// Logical streams, each backed by its own durable log
///
/// Offsets are assigned independently per stream: the first event in a
/// stream has offset 1 and every append increments by exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    /// User registrations
    Users,
    /// One-on-one chat messages
    Messages,
    /// Room registrations
    Rooms,
    /// Messages sent inside rooms
    RoomMessages,
    /// Auxiliary log of sender display names (replayed in full)
    Senders,
    /// Auxiliary log of receiver display names (replayed in full)
    Receivers,
}

impl Stream {
    /// All streams, in the order recovery replays them
    pub const ALL: [Stream; 6] = [
        Stream::Users,
        Stream::Messages,
        Stream::Senders,
        Stream::Receivers,
        Stream::Rooms,
        Stream::RoomMessages,
    ];

    /// File name of the stream's durable log
    pub fn file_name(&self) -> &'static str {
        match self {
            Stream::Users => "users.jsonl",
            Stream::Messages => "messages.jsonl",
            Stream::Rooms => "rooms.jsonl",
            Stream::RoomMessages => "room_messages.jsonl",
            Stream::Senders => "senders.jsonl",
            Stream::Receivers => "receivers.jsonl",
        }
    }

    /// Whether a reconnecting client's offset cursor applies to this stream
    ///
    /// The participant streams carry no cursor: they are replayed in full
    /// on every recovery, like the source tables they mirror.
    pub fn uses_cursor(&self) -> bool {
        !matches!(self, Stream::Senders | Stream::Receivers)
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Users => write!(f, "users"),
            Stream::Messages => write!(f, "messages"),
            Stream::Rooms => write!(f, "rooms"),
            Stream::RoomMessages => write!(f, "room_messages"),
            Stream::Senders => write!(f, "senders"),
            Stream::Receivers => write!(f, "receivers"),
        }
    }
}

/// Event kinds that can occur in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new username was registered
    UserRegistered,
    /// A one-on-one message was sent
    DirectMessage,
    /// A new room was registered
    RoomRegistered,
    /// A message was sent inside a room
    RoomMessage,
    /// A sender/receiver display name was observed
    ParticipantNoted,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::UserRegistered => write!(f, "user_registered"),
            EventKind::DirectMessage => write!(f, "direct_message"),
            EventKind::RoomRegistered => write!(f, "room_registered"),
            EventKind::RoomMessage => write!(f, "room_message"),
            EventKind::ParticipantNoted => write!(f, "participant_noted"),
        }
    }
}

/// Data payload for UserRegistered event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegisteredData {
    pub username: String,
    pub credential: String,
}

/// Data payload for DirectMessage event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessageData {
    pub content: String,
    pub sender: String,
    pub receiver: String,
}

/// Data payload for RoomRegistered event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRegisteredData {
    pub roomname: String,
    pub credential: String,
}

/// Data payload for RoomMessage event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMessageData {
    pub content: String,
    pub sender: String,
    pub receiver: String,
}

/// Data payload for ParticipantNoted event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantNotedData {
    pub role: ParticipantRole,
    pub name: String,
}

/// An immutable event in a stream's durable log
///
/// Events are the source of truth. The offset is assigned by the log at
/// append time and doubles as the reconnect cursor; the client offset is
/// the caller-supplied idempotency token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Kind of event
    pub kind: EventKind,

    /// Stream this event belongs to
    pub stream: Stream,

    /// Position within the stream, assigned at append time
    pub offset: u64,

    /// Client-supplied idempotency token
    #[serde(rename = "clientOffset")]
    pub client_offset: String,

    /// Unix timestamp when the event was appended
    #[serde(rename = "ts")]
    pub timestamp: i64,

    /// Kind-specific payload
    pub data: serde_json::Value,
}

impl Event {
    /// Create a new event with auto-generated timestamp
    pub fn new(
        kind: EventKind,
        stream: Stream,
        offset: u64,
        client_offset: String,
        data: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            stream,
            offset,
            client_offset,
            timestamp: crate::utils::current_timestamp() as i64,
            data,
        }
    }

    /// Parse the event data as a specific payload type
    pub fn parse_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    /// Serialize event to JSON string (for JSONL)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from JSON string
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
