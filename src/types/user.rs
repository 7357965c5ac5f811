//! Registered user records

use serde::Serialize;

/// A registered user, rebuilt from the users stream at startup
///
/// The credential is held for login comparison only and is deliberately
/// not serializable: records that leave the process go out as [`UserBrief`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub credential: String,
    /// Offset of the registration event in the users stream
    pub offset: u64,
    /// Idempotency token the registration was submitted with
    pub client_offset: String,
}

/// Public view of a registered user
#[derive(Debug, Clone, Serialize)]
pub struct UserBrief {
    pub username: String,
    pub offset: u64,
}

impl From<&UserRecord> for UserBrief {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            offset: record.offset,
        }
    }
}
