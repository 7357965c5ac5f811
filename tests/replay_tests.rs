//! Replay Protocol Integration Tests
//!
//! Tests for the complete durability and replay flow:
//! - Offset assignment across appends and restarts
//! - Registration idempotency guard
//! - Cursor-based history replay
//! - The recovery/live boundary

use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};

use chat_relay::chat::{ChatError, ChatLog, StreamCursor};
use chat_relay::event_log::EventLogConfig;
use chat_relay::types::{EventKind, Stream};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_data_dir() -> std::path::PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::path::PathBuf::from(format!(
        "target/test_replay_{}_{}",
        std::process::id(),
        id
    ))
}

fn cleanup_dir(path: &std::path::Path) {
    let _ = fs::remove_dir_all(path);
}

#[test]
fn test_offsets_strictly_increasing_and_gapless() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    for i in 0..10 {
        let event = chat
            .send_direct_message(&format!("c{}", i), "msg", "alice", "bob")
            .expect("append message");
        assert_eq!(event.offset, i + 1);
    }

    let events = chat
        .event_log()
        .load_events(Stream::Messages)
        .expect("load messages");
    let offsets: Vec<u64> = events.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, (1..=10).collect::<Vec<u64>>());

    cleanup_dir(&data_dir);
}

#[test]
fn test_duplicate_registration_single_success() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    let first = chat.register_user("alice", "secret", "c1");
    let second = chat.register_user("alice", "secret", "c2");

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(ChatError::Conflict { stream: Stream::Users, .. })
    ));

    // Log still holds exactly one registration
    let events = chat.event_log().load_events(Stream::Users).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].offset, 1);

    cleanup_dir(&data_dir);
}

#[test]
fn test_registration_guard_never_applies_to_messages() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    // Identical token and content, five times over: all accepted
    for _ in 0..5 {
        chat.send_direct_message("same-token", "same text", "alice", "bob")
            .expect("message never rejected");
    }
    assert_eq!(
        chat.event_log().load_events(Stream::Messages).unwrap().len(),
        5
    );

    // While the same name is always rejected, whatever the token
    chat.register_room("general", "pw", "r1").unwrap();
    assert!(chat.register_room("general", "pw", "r2").is_err());
    assert!(chat.register_room("general", "other", "r3").is_err());

    cleanup_dir(&data_dir);
}

#[test]
fn test_full_history_replay_with_zero_cursor() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    chat.register_user("alice", "secret", "u1").unwrap();
    chat.register_user("bob", "secret", "u2").unwrap();
    chat.send_direct_message("m1", "hi", "alice", "bob").unwrap();
    chat.register_room("general", "pw", "r1").unwrap();
    chat.send_room_message("rm1", "hello", "alice", "general").unwrap();

    let replay = chat.history_after(&StreamCursor::default()).unwrap();
    assert_eq!(replay.len(), 5);

    // Each stream's slice comes back in ascending offset order
    for stream in Stream::ALL {
        let offsets: Vec<u64> = replay
            .iter()
            .filter(|e| e.stream == stream)
            .map(|e| e.offset)
            .collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }

    cleanup_dir(&data_dir);
}

#[test]
fn test_replay_after_cursor_is_exact() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    for i in 1..=5 {
        chat.send_direct_message(&format!("c{}", i), &format!("msg {}", i), "alice", "bob")
            .unwrap();
    }

    let cursor = StreamCursor {
        messages: 3,
        ..Default::default()
    };
    let replay = chat.history_after(&cursor).unwrap();

    let offsets: Vec<u64> = replay.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![4, 5]);

    cleanup_dir(&data_dir);
}

#[test]
fn test_restart_recovers_offsets_and_registry() {
    let data_dir = test_data_dir();

    // First process lifetime
    {
        let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");
        chat.register_user("alice", "secret", "u1").unwrap();
        chat.register_user("bob", "hunter2", "u2").unwrap();
        chat.send_direct_message("m1", "hi", "alice", "bob").unwrap();
    }

    // Simulate restart - state is rebuilt from the stream files
    {
        let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("reopen chat log");

        // Offsets continue where they left off
        let carol = chat.register_user("carol", "pw", "u3").unwrap();
        assert_eq!(carol.offset, 3);
        let msg = chat.send_direct_message("m2", "again", "bob", "alice").unwrap();
        assert_eq!(msg.offset, 2);

        // The guard still knows the old names
        assert!(chat.register_user("alice", "other", "u4").is_err());

        // Credentials survived for login
        assert!(chat.authenticate("bob", "hunter2").is_ok());
        assert!(chat.authenticate("bob", "wrong").is_err());
    }

    cleanup_dir(&data_dir);
}

#[test]
fn test_alice_bob_scenario() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    // Register alice -> offset 1 in the users stream
    let reg = chat.register_user("alice", "secret", "u1").unwrap();
    assert_eq!(reg.offset, 1);

    // Register alice again -> conflict, log still length 1
    assert!(chat.register_user("alice", "secret", "u2").is_err());
    assert_eq!(chat.event_log().load_events(Stream::Users).unwrap().len(), 1);

    // Message "hi" from alice to bob -> offset 1 in the message stream
    let msg = chat.send_direct_message("m1", "hi", "alice", "bob").unwrap();
    assert_eq!(msg.offset, 1);

    // Reconnect with offset 0 -> replay delivers both events
    let replay = chat.history_after(&StreamCursor::default()).unwrap();
    assert_eq!(replay.len(), 2);
    assert!(replay
        .iter()
        .any(|e| e.kind == EventKind::UserRegistered && e.offset == 1));
    assert!(replay
        .iter()
        .any(|e| e.kind == EventKind::DirectMessage && e.offset == 1));

    cleanup_dir(&data_dir);
}

#[test]
fn test_participant_logs_replay_in_full() {
    let data_dir = test_data_dir();
    let chat = ChatLog::open(EventLogConfig::new(&data_dir)).expect("open chat log");

    chat.note_participant(chat_relay::types::ParticipantRole::Sender, "alice")
        .unwrap();
    chat.note_participant(chat_relay::types::ParticipantRole::Receiver, "bob")
        .unwrap();

    // A client fully caught up on the cursor streams still gets the
    // participant logs, every time
    let cursor = chat.head_cursor();
    let replay = chat.history_after(&cursor).unwrap();
    assert_eq!(replay.len(), 2);
    assert!(replay.iter().all(|e| e.kind == EventKind::ParticipantNoted));

    cleanup_dir(&data_dir);
}

#[tokio::test]
async fn test_live_events_follow_replay() {
    let data_dir = test_data_dir();
    let chat = std::sync::Arc::new(ChatLog::open(EventLogConfig::new(&data_dir)).unwrap());
    let state = chat_relay::api::websocket::state::AppState::new(chat.clone());

    chat.send_direct_message("m1", "before", "alice", "bob").unwrap();
    chat.send_direct_message("m2", "also before", "alice", "bob").unwrap();

    // Subscribe-then-replay: the replay snapshot covers offsets 1..=2
    let mut rx = state.subscribe();
    let replay = chat.history_after(&StreamCursor::default()).unwrap();
    assert_eq!(replay.len(), 2);
    let replay_max = replay.iter().map(|e| e.offset).max().unwrap();

    // A message sent after the snapshot arrives through the live channel
    chat.send_direct_message("m3", "live now", "alice", "bob").unwrap();

    loop {
        let msg = rx.recv().await.expect("broadcast open");
        let json = serde_json::to_string(&msg).unwrap();
        if json.contains("live now") {
            assert!(json.contains(&format!("\"offset\":{}", replay_max + 1)));
            break;
        }
    }

    cleanup_dir(&data_dir);
}
