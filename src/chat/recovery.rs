//! History replay for reconnecting sessions
//!
//! A reconnecting client presents the last offset it acknowledged per
//! stream; `history_after` returns every newer event. The server keeps no
//! per-client cursor: the client resends its cursor on every connect, and
//! a replay that is interrupted mid-flight is simply retried in full on
//! the next connection.

use serde::{Deserialize, Serialize};

use crate::types::{Event, Stream};

use super::{ChatLog, ChatResult};

/// Per-stream reconnect cursor
///
/// A missing or zero offset means "replay the full stream". The
/// participant streams never carry a cursor, so they have no field here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCursor {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub rooms: u64,
    #[serde(default)]
    pub room_messages: u64,
}

impl StreamCursor {
    /// The cursor value to replay a stream from
    pub fn for_stream(&self, stream: Stream) -> u64 {
        match stream {
            Stream::Users => self.users,
            Stream::Messages => self.messages,
            Stream::Rooms => self.rooms,
            Stream::RoomMessages => self.room_messages,
            // Full replay, always
            Stream::Senders | Stream::Receivers => 0,
        }
    }
}

/// Collect every event newer than the cursor, stream by stream
///
/// Within one stream events come back in ascending offset order; the
/// streams themselves are concatenated in `Stream::ALL` order. Each
/// stream read is a snapshot at call time — events appended while the
/// replay is being delivered arrive again through the live broadcast,
/// which is the accepted at-least-once boundary.
pub fn history_after(chat: &ChatLog, cursor: &StreamCursor) -> ChatResult<Vec<Event>> {
    let mut replay = Vec::new();

    for stream in Stream::ALL {
        let after = if stream.uses_cursor() {
            cursor.for_stream(stream)
        } else {
            0
        };
        replay.extend(chat.log.read_after(stream, after)?);
    }

    Ok(replay)
}
