//! Message records returned by the REST read endpoints

use serde::Serialize;

/// A stored chat message with its stream offset
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub offset: u64,
    pub content: String,
    pub sender: String,
    pub receiver: String,
}
