//! WebSocket connection handler
//!
//! Implements the connect flow for a session: subscribe, replay history
//! past the client's cursor, then go live. Replay strictly precedes live
//! delivery; an event appended while the replay is in flight is delivered
//! again by the live loop, which is the accepted at-least-once boundary.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::api::session::SessionState;
use crate::chat::{ChatError, StreamCursor};

use super::events::{
    ClientCommand, ConflictMessage, CredentialErrorMessage, LoginOkMessage, PongMessage,
    ServerEvent, WelcomeMessage, WsMessage,
};
use super::state::AppState;

/// Query parameters for WebSocket connection
///
/// Each offset is the last one the client acknowledged for that stream;
/// absent or zero means full history. `recovered` lets a client skip the
/// replay when its transport already performed it.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub rooms: u64,
    #[serde(default)]
    pub room_messages: u64,
    #[serde(default)]
    pub recovered: bool,
}

impl ConnectParams {
    /// The reconnect cursor these parameters describe
    pub fn cursor(&self) -> StreamCursor {
        StreamCursor {
            users: self.users,
            messages: self.messages,
            rooms: self.rooms,
            room_messages: self.room_messages,
        }
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params))
}

/// Serialize a frame and send it on the socket
async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(_) => Ok(()),
    }
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, params: ConnectParams) {
    let cursor = params.cursor();
    let session = state.sessions.create_session(cursor, params.recovered).await;
    let session_id = session.session_id.clone();

    // Subscribe to broadcast events before reading history, so nothing
    // appended during the replay can be missed
    let mut rx = state.subscribe();

    let (mut sender, mut receiver) = socket.split();

    // Send welcome message with the current head offsets
    let welcome = WelcomeMessage::new(session_id.clone(), state.chat.head_cursor());
    if send_json(&mut sender, &welcome).await.is_err() {
        state.sessions.remove_session(&session_id).await;
        return; // Client disconnected immediately
    }

    // Recovery phase: replay everything newer than the client's cursor
    if !params.recovered {
        state
            .sessions
            .set_state(&session_id, SessionState::Recovering)
            .await;

        match state.chat.history_after(&cursor) {
            Ok(events) => {
                for event in &events {
                    let wire = match ServerEvent::from_event(event) {
                        Ok(wire) => wire,
                        Err(e) => {
                            eprintln!(
                                "Warning: skipping unreadable {} event {}: {}",
                                event.stream, event.offset, e
                            );
                            continue;
                        }
                    };
                    let msg = WsMessage {
                        event: wire,
                        timestamp: event.timestamp,
                    };
                    if send_json(&mut sender, &msg).await.is_err() {
                        // Recovery interrupted: discard it, the client
                        // retries in full on its next connection
                        state.sessions.remove_session(&session_id).await;
                        return;
                    }
                }
            }
            Err(e) => {
                eprintln!("Error replaying history for {}: {}", session_id, e);
                let error_msg = serde_json::json!({
                    "type": "error",
                    "code": "storage",
                    "message": "History replay failed, please reconnect"
                });
                let _ = sender.send(Message::Text(error_msg.to_string())).await;
                state.sessions.remove_session(&session_id).await;
                return;
            }
        }
    }

    state.sessions.set_state(&session_id, SessionState::Live).await;

    loop {
        tokio::select! {
            // Broadcast events to client
            result = rx.recv() => {
                match result {
                    Ok(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                break; // Client disconnected
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Client is too slow, they missed events
                        // Send an error message so they know to reconnect
                        let error_msg = serde_json::json!({
                            "type": "error",
                            "code": "lagged",
                            "message": format!("Missed {} events, please reconnect", n)
                        });
                        let _ = sender.send(Message::Text(error_msg.to_string())).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break; // Channel closed
                    }
                }
            }

            // Handle client messages
            result = receiver.next() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut sender, &state, &session_id).await {
                            break; // Client requested close or error
                        }
                    }
                    Some(Err(_)) => break, // WebSocket error
                    None => break, // Client disconnected
                }
            }
        }
    }

    // Disconnected is terminal: the server keeps no cursor for the client
    state.sessions.remove_session(&session_id).await;
}

/// Handle a message from the client
/// Returns false if the connection should be closed
async fn handle_client_message(
    msg: Message,
    sender: &mut SplitSink<WebSocket, Message>,
    state: &Arc<AppState>,
    session_id: &str,
) -> bool {
    match msg {
        Message::Text(text) => {
            if let Ok(cmd) = serde_json::from_str::<ClientCommand>(&text) {
                apply_command(cmd, sender, state, session_id).await;
            }
            true
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(data) => {
            let _ = sender.send(Message::Pong(data)).await;
            true
        }
        Message::Pong(_) => true,  // Ignore pong responses
        Message::Close(_) => false, // Client requested close
    }
}

/// Apply a client command to the chat log
///
/// Successful appends answer the session through the broadcast fan-out;
/// conflicts and credential failures go back to this session only.
async fn apply_command(
    cmd: ClientCommand,
    sender: &mut SplitSink<WebSocket, Message>,
    state: &Arc<AppState>,
    session_id: &str,
) {
    match cmd {
        ClientCommand::Ping => {
            let _ = send_json(sender, &PongMessage::default()).await;
        }

        ClientCommand::RegisterUser {
            username,
            credential,
            client_offset,
        } => match state.chat.register_user(&username, &credential, &client_offset) {
            Ok(_) => {}
            Err(ChatError::Conflict { .. }) => {
                let _ = send_json(sender, &ConflictMessage::user_exists(&username)).await;
            }
            Err(e @ ChatError::DuplicateToken { .. }) => report_duplicate_token(sender, &e).await,
            Err(e) => report_storage_error(sender, &e).await,
        },

        ClientCommand::Login {
            username,
            credential,
        } => match state.chat.authenticate(&username, &credential) {
            Ok(seed) => {
                state
                    .sessions
                    .set_username(session_id, seed.username.clone())
                    .await;
                let _ = send_json(sender, &LoginOkMessage::new(seed.username, seed.heads)).await;
            }
            Err(ChatError::InvalidCredential) => {
                let _ = send_json(sender, &CredentialErrorMessage::default()).await;
            }
            Err(e) => report_storage_error(sender, &e).await,
        },

        ClientCommand::DirectMessage {
            client_offset,
            content,
            sender: from,
            receiver: to,
        } => {
            if let Err(e) = state
                .chat
                .send_direct_message(&client_offset, &content, &from, &to)
            {
                report_storage_error(sender, &e).await;
            }
        }

        ClientCommand::RegisterRoom {
            roomname,
            credential,
            client_offset,
        } => match state.chat.register_room(&roomname, &credential, &client_offset) {
            Ok(_) => {}
            Err(ChatError::Conflict { .. }) => {
                let _ = send_json(sender, &ConflictMessage::room_exists(&roomname)).await;
            }
            Err(e @ ChatError::DuplicateToken { .. }) => report_duplicate_token(sender, &e).await,
            Err(e) => report_storage_error(sender, &e).await,
        },

        ClientCommand::RoomMessage {
            client_offset,
            content,
            sender: from,
            receiver: to,
        } => {
            if let Err(e) = state
                .chat
                .send_room_message(&client_offset, &content, &from, &to)
            {
                report_storage_error(sender, &e).await;
            }
        }

        ClientCommand::Participant { role, name } => {
            if let Err(e) = state.chat.note_participant(role, &name) {
                report_storage_error(sender, &e).await;
            }
        }
    }
}

/// Tell the originating session its registration token was already used
async fn report_duplicate_token(sender: &mut SplitSink<WebSocket, Message>, error: &ChatError) {
    let error_msg = serde_json::json!({
        "type": "error",
        "code": "duplicate_token",
        "message": error.to_string()
    });
    let _ = sender.send(Message::Text(error_msg.to_string())).await;
}

/// Surface a failed append to the originating session; no retry
async fn report_storage_error(sender: &mut SplitSink<WebSocket, Message>, error: &ChatError) {
    eprintln!("Error applying client command: {}", error);
    let error_msg = serde_json::json!({
        "type": "error",
        "code": "storage",
        "message": error.to_string()
    });
    let _ = sender.send(Message::Text(error_msg.to_string())).await;
}
