//! Registration streams: users and rooms
//!
//! The idempotency guard for registration is the natural-key lookup in the
//! in-memory registry: a name can be claimed exactly once, whatever
//! idempotency token the attempt carries. The registry lock is held across
//! lookup, append and broadcast, so two concurrent registrations of the
//! same name resolve to exactly one appended event and one conflict.

use serde::Serialize;

use crate::api::websocket::broadcaster::helpers;
use crate::types::{
    Event, EventKind, RoomBrief, RoomRecord, RoomRegisteredData, Stream, UserBrief, UserRecord,
    UserRegisteredData,
};

use super::{ChatError, ChatLog, ChatResult, StreamCursor};

/// Login result: everything a new session needs to start
///
/// Carried in per-session state, never in process-global state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSeed {
    pub username: String,
    /// Current head offset per stream, a starting cursor for the client
    pub heads: StreamCursor,
}

/// Register a new username
///
/// Returns `Conflict` carrying the existing name if it is already taken.
pub fn register_user(
    chat: &ChatLog,
    username: &str,
    credential: &str,
    client_offset: &str,
) -> ChatResult<Event> {
    let mut registry = chat.users.lock();

    if let Some(existing) = registry.by_name.get(username) {
        return Err(ChatError::Conflict {
            stream: Stream::Users,
            name: username.to_string(),
            existing_offset: existing.offset,
        });
    }

    // The token guard: a retried action must not append twice
    if !client_offset.is_empty() && registry.tokens.contains(client_offset) {
        return Err(ChatError::DuplicateToken {
            stream: Stream::Users,
            token: client_offset.to_string(),
        });
    }

    let offset = registry.next_offset;
    let data = UserRegisteredData {
        username: username.to_string(),
        credential: credential.to_string(),
    };
    let event = Event::new(
        EventKind::UserRegistered,
        Stream::Users,
        offset,
        client_offset.to_string(),
        serde_json::to_value(&data)?,
    );

    chat.log.append_event(&event)?;

    registry.by_name.insert(
        username.to_string(),
        UserRecord {
            username: username.to_string(),
            credential: credential.to_string(),
            offset,
            client_offset: client_offset.to_string(),
        },
    );
    if !client_offset.is_empty() {
        registry.tokens.insert(client_offset.to_string());
    }
    registry.next_offset = offset + 1;

    // Broadcast while the registry lock is held: fan-out order == log order
    helpers::user_registered(offset, username);

    Ok(event)
}

/// Authenticate a user against the registry
///
/// Read-only: a successful login appends nothing to any stream.
pub fn authenticate(chat: &ChatLog, username: &str, credential: &str) -> ChatResult<SessionSeed> {
    {
        let registry = chat.users.lock();
        match registry.by_name.get(username) {
            Some(record) if record.credential == credential => {}
            _ => return Err(ChatError::InvalidCredential),
        }
    }

    Ok(SessionSeed {
        username: username.to_string(),
        heads: chat.head_cursor(),
    })
}

/// Register a new room
pub fn register_room(
    chat: &ChatLog,
    roomname: &str,
    credential: &str,
    client_offset: &str,
) -> ChatResult<Event> {
    let mut registry = chat.rooms.lock();

    if let Some(existing) = registry.by_name.get(roomname) {
        return Err(ChatError::Conflict {
            stream: Stream::Rooms,
            name: roomname.to_string(),
            existing_offset: existing.offset,
        });
    }

    if !client_offset.is_empty() && registry.tokens.contains(client_offset) {
        return Err(ChatError::DuplicateToken {
            stream: Stream::Rooms,
            token: client_offset.to_string(),
        });
    }

    let offset = registry.next_offset;
    let data = RoomRegisteredData {
        roomname: roomname.to_string(),
        credential: credential.to_string(),
    };
    let event = Event::new(
        EventKind::RoomRegistered,
        Stream::Rooms,
        offset,
        client_offset.to_string(),
        serde_json::to_value(&data)?,
    );

    chat.log.append_event(&event)?;

    registry.by_name.insert(
        roomname.to_string(),
        RoomRecord {
            roomname: roomname.to_string(),
            credential: credential.to_string(),
            offset,
            client_offset: client_offset.to_string(),
        },
    );
    if !client_offset.is_empty() {
        registry.tokens.insert(client_offset.to_string());
    }
    registry.next_offset = offset + 1;

    helpers::room_registered(offset, roomname);

    Ok(event)
}

/// All registered users, in registration order
pub fn list_users(chat: &ChatLog) -> Vec<UserBrief> {
    let registry = chat.users.lock();
    let mut users: Vec<UserBrief> = registry.by_name.values().map(UserBrief::from).collect();
    users.sort_by_key(|u| u.offset);
    users
}

/// All registered rooms, in registration order
pub fn list_rooms(chat: &ChatLog) -> Vec<RoomBrief> {
    let registry = chat.rooms.lock();
    let mut rooms: Vec<RoomBrief> = registry.by_name.values().map(RoomBrief::from).collect();
    rooms.sort_by_key(|r| r.offset);
    rooms
}

/// Look up a single room by name
pub fn get_room(chat: &ChatLog, roomname: &str) -> Option<RoomBrief> {
    chat.rooms.lock().by_name.get(roomname).map(RoomBrief::from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::event_log::EventLogConfig;
    use crate::types::Stream;

    use super::super::{ChatError, ChatLog};

    fn create_test_chat() -> (ChatLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let chat = ChatLog::open(EventLogConfig::new(temp_dir.path())).unwrap();
        (chat, temp_dir)
    }

    #[test]
    fn test_register_user_assigns_offsets() {
        let (chat, _temp_dir) = create_test_chat();

        let first = chat.register_user("alice", "secret", "c1").unwrap();
        let second = chat.register_user("bob", "hunter2", "c2").unwrap();

        assert_eq!(first.offset, 1);
        assert_eq!(second.offset, 2);
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let (chat, _temp_dir) = create_test_chat();

        chat.register_user("alice", "secret", "c1").unwrap();
        let result = chat.register_user("alice", "other", "c2");

        match result {
            Err(ChatError::Conflict {
                stream,
                name,
                existing_offset,
            }) => {
                assert_eq!(stream, Stream::Users);
                assert_eq!(name, "alice");
                assert_eq!(existing_offset, 1);
            }
            other => panic!("expected conflict, got {:?}", other.map(|e| e.offset)),
        }

        // Log still holds exactly one registration
        let events = chat.event_log().load_events(Stream::Users).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected_regardless_of_token() {
        let (chat, _temp_dir) = create_test_chat();

        chat.register_user("alice", "secret", "c1").unwrap();
        // Same token as the original attempt
        assert!(chat.register_user("alice", "secret", "c1").is_err());
        // Fresh token changes nothing
        assert!(chat.register_user("alice", "secret", "c99").is_err());
    }

    #[test]
    fn test_claimed_token_rejected_for_new_name() {
        let (chat, _temp_dir) = create_test_chat();

        chat.register_user("alice", "secret", "c1").unwrap();
        let result = chat.register_user("someone_else", "pw", "c1");

        assert!(matches!(
            result,
            Err(ChatError::DuplicateToken { stream: Stream::Users, .. })
        ));
        assert_eq!(chat.event_log().load_events(Stream::Users).unwrap().len(), 1);

        // Tokens are claimed per stream: the rooms stream is unaffected
        assert!(chat.register_room("lobby", "pw", "c1").is_ok());
    }

    #[test]
    fn test_concurrent_registration_exactly_one_winner() {
        let (chat, _temp_dir) = create_test_chat();
        let chat = Arc::new(chat);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let chat = Arc::clone(&chat);
                std::thread::spawn(move || {
                    chat.register_user("alice", "secret", &format!("c{}", i))
                        .is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        let events = chat.event_log().load_events(Stream::Users).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_authenticate() {
        let (chat, _temp_dir) = create_test_chat();
        chat.register_user("alice", "secret", "c1").unwrap();

        let seed = chat.authenticate("alice", "secret").unwrap();
        assert_eq!(seed.username, "alice");
        assert_eq!(seed.heads.users, 1);

        assert!(matches!(
            chat.authenticate("alice", "wrong"),
            Err(ChatError::InvalidCredential)
        ));
        assert!(matches!(
            chat.authenticate("nobody", "secret"),
            Err(ChatError::InvalidCredential)
        ));
    }

    #[test]
    fn test_rooms_and_users_do_not_collide() {
        let (chat, _temp_dir) = create_test_chat();

        chat.register_user("general", "pw", "c1").unwrap();
        // Same name in the rooms stream is a different natural key
        let room = chat.register_room("general", "pw", "c2").unwrap();
        assert_eq!(room.offset, 1);
    }
}
