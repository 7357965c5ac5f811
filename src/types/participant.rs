//! Participant roles for the auxiliary sender/receiver logs

use serde::{Deserialize, Serialize};

use super::event::Stream;

/// Role a display name was observed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Sender,
    Receiver,
}

impl ParticipantRole {
    /// The auxiliary stream that records this role
    pub fn stream(&self) -> Stream {
        match self {
            ParticipantRole::Sender => Stream::Senders,
            ParticipantRole::Receiver => Stream::Receivers,
        }
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Sender => write!(f, "sender"),
            ParticipantRole::Receiver => write!(f, "receiver"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_streams() {
        assert_eq!(ParticipantRole::Sender.stream(), Stream::Senders);
        assert_eq!(ParticipantRole::Receiver.stream(), Stream::Receivers);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ParticipantRole::Receiver).unwrap();
        assert_eq!(json, "\"receiver\"");
    }
}
