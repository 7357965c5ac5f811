//! Message streams and the auxiliary participant logs
//!
//! Message appends are unguarded: the same content or token may be stored
//! any number of times. Registration is the only idempotent surface.

use crate::api::websocket::broadcaster::helpers;
use crate::types::{
    DirectMessageData, Event, EventKind, ParticipantNotedData, ParticipantRole, RoomMessageData,
    Stream,
};

use super::{ChatLog, ChatResult};

/// Send a one-on-one message
pub fn send_direct_message(
    chat: &ChatLog,
    client_offset: &str,
    content: &str,
    sender: &str,
    receiver: &str,
) -> ChatResult<Event> {
    let data = DirectMessageData {
        content: content.to_string(),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
    };

    let mut guard = chat.messages.lock();
    let offset = guard.next_offset;
    let event = Event::new(
        EventKind::DirectMessage,
        Stream::Messages,
        offset,
        client_offset.to_string(),
        serde_json::to_value(&data)?,
    );
    chat.log.append_event(&event)?;
    guard.next_offset = offset + 1;

    // Broadcast while the stream lock is held: fan-out order == log order
    helpers::direct_message(offset, content, sender, receiver);

    Ok(event)
}

/// Send a message into a room
pub fn send_room_message(
    chat: &ChatLog,
    client_offset: &str,
    content: &str,
    sender: &str,
    receiver: &str,
) -> ChatResult<Event> {
    let data = RoomMessageData {
        content: content.to_string(),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
    };

    let mut guard = chat.room_messages.lock();
    let offset = guard.next_offset;
    let event = Event::new(
        EventKind::RoomMessage,
        Stream::RoomMessages,
        offset,
        client_offset.to_string(),
        serde_json::to_value(&data)?,
    );
    chat.log.append_event(&event)?;
    guard.next_offset = offset + 1;

    helpers::room_message(offset, content, sender, receiver);

    Ok(event)
}

/// Record a sender/receiver display name in its auxiliary stream
///
/// These streams carry no client cursor and are replayed in full; the
/// append is still offset-stamped so the file format stays uniform.
pub fn note_participant(chat: &ChatLog, role: ParticipantRole, name: &str) -> ChatResult<Event> {
    let data = ParticipantNotedData {
        role,
        name: name.to_string(),
    };
    let state = match role {
        ParticipantRole::Sender => &chat.senders,
        ParticipantRole::Receiver => &chat.receivers,
    };

    let mut guard = state.lock();
    let offset = guard.next_offset;
    let event = Event::new(
        EventKind::ParticipantNoted,
        role.stream(),
        offset,
        String::new(),
        serde_json::to_value(&data)?,
    );
    chat.log.append_event(&event)?;
    guard.next_offset = offset + 1;

    helpers::participant_noted(role, name);

    Ok(event)
}
