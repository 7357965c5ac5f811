//! Registered room records

use serde::Serialize;

/// A registered room, rebuilt from the rooms stream at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    pub roomname: String,
    pub credential: String,
    /// Offset of the registration event in the rooms stream
    pub offset: u64,
    /// Idempotency token the registration was submitted with
    pub client_offset: String,
}

/// Public view of a registered room
#[derive(Debug, Clone, Serialize)]
pub struct RoomBrief {
    pub roomname: String,
    pub offset: u64,
}

impl From<&RoomRecord> for RoomBrief {
    fn from(record: &RoomRecord) -> Self {
        Self {
            roomname: record.roomname.clone(),
            offset: record.offset,
        }
    }
}
