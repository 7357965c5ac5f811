//! WebSocket wire types for the chat relay

use serde::{Deserialize, Serialize};

use crate::chat::StreamCursor;
use crate::types::{
    DirectMessageData, Event, EventKind, ParticipantNotedData, ParticipantRole, RoomMessageData,
    RoomRegisteredData, UserRegisteredData,
};

/// Events delivered to clients, both as replay and as live broadcast
///
/// Credentials never appear here: the durable log keeps them, the wire
/// does not.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A username was registered
    UserRegistered { offset: u64, username: String },

    /// A one-on-one message was sent
    DirectMessage {
        offset: u64,
        content: String,
        sender: String,
        receiver: String,
    },

    /// A room was registered
    RoomRegistered { offset: u64, roomname: String },

    /// A message was sent inside a room
    RoomMessage {
        offset: u64,
        content: String,
        sender: String,
        receiver: String,
    },

    /// A sender/receiver display name was observed
    ParticipantNoted { role: ParticipantRole, name: String },
}

impl ServerEvent {
    /// Build the wire event for a logged event, stripping credentials
    pub fn from_event(event: &Event) -> Result<Self, serde_json::Error> {
        Ok(match event.kind {
            EventKind::UserRegistered => {
                let data: UserRegisteredData = event.parse_data()?;
                ServerEvent::UserRegistered {
                    offset: event.offset,
                    username: data.username,
                }
            }
            EventKind::DirectMessage => {
                let data: DirectMessageData = event.parse_data()?;
                ServerEvent::DirectMessage {
                    offset: event.offset,
                    content: data.content,
                    sender: data.sender,
                    receiver: data.receiver,
                }
            }
            EventKind::RoomRegistered => {
                let data: RoomRegisteredData = event.parse_data()?;
                ServerEvent::RoomRegistered {
                    offset: event.offset,
                    roomname: data.roomname,
                }
            }
            EventKind::RoomMessage => {
                let data: RoomMessageData = event.parse_data()?;
                ServerEvent::RoomMessage {
                    offset: event.offset,
                    content: data.content,
                    sender: data.sender,
                    receiver: data.receiver,
                }
            }
            EventKind::ParticipantNoted => {
                let data: ParticipantNotedData = event.parse_data()?;
                ServerEvent::ParticipantNoted {
                    role: data.role,
                    name: data.name,
                }
            }
        })
    }
}

/// WebSocket message wrapper with metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WsMessage {
    /// The chat event
    #[serde(flatten)]
    pub event: ServerEvent,

    /// Unix timestamp when the event was appended or broadcast
    pub timestamp: i64,
}

/// Commands a client may send over the socket
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Register a new username
    RegisterUser {
        username: String,
        credential: String,
        client_offset: String,
    },

    /// Authenticate an existing username
    Login { username: String, credential: String },

    /// Send a one-on-one message
    DirectMessage {
        client_offset: String,
        content: String,
        sender: String,
        receiver: String,
    },

    /// Register a new room
    RegisterRoom {
        roomname: String,
        credential: String,
        client_offset: String,
    },

    /// Send a message into a room
    RoomMessage {
        client_offset: String,
        content: String,
        sender: String,
        receiver: String,
    },

    /// Record a sender/receiver display name
    Participant { role: ParticipantRole, name: String },

    /// Ping for heartbeat
    Ping,
}

/// Welcome message sent on connection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub session_id: String,
    /// Current head offset per stream, for the client to persist
    pub heads: StreamCursor,
}

impl WelcomeMessage {
    pub fn new(session_id: String, heads: StreamCursor) -> Self {
        Self {
            msg_type: "connected".to_string(),
            session_id,
            heads,
        }
    }
}

/// Conflict notice, sent to the originating session only
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConflictMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub name: String,
    pub message: String,
    /// Path the client should offer as a way out
    pub remediation: String,
}

impl ConflictMessage {
    pub fn user_exists(name: &str) -> Self {
        Self {
            msg_type: "user_exists".to_string(),
            name: name.to_string(),
            message: format!("User with name '{}' already exists", name),
            remediation: "/signup".to_string(),
        }
    }

    pub fn room_exists(name: &str) -> Self {
        Self {
            msg_type: "room_exists".to_string(),
            name: name.to_string(),
            message: format!("Room with name '{}' already exists", name),
            remediation: "/createroom".to_string(),
        }
    }
}

/// Login rejection, sent to the originating session only
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub message: String,
    pub remediation: String,
}

impl Default for CredentialErrorMessage {
    fn default() -> Self {
        Self {
            msg_type: "invalid_credential".to_string(),
            message: "username or credential are wrong".to_string(),
            remediation: "/login".to_string(),
        }
    }
}

/// Successful login, sent to the originating session only
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginOkMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub username: String,
    pub heads: StreamCursor,
}

impl LoginOkMessage {
    pub fn new(username: String, heads: StreamCursor) -> Self {
        Self {
            msg_type: "login_ok".to_string(),
            username,
            heads,
        }
    }
}

/// Pong response message
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PongMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
}

impl Default for PongMessage {
    fn default() -> Self {
        Self {
            msg_type: "pong".to_string(),
        }
    }
}
