//! Message endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResponse};
use crate::api::websocket::state::AppState;
use crate::types::{DirectMessageData, MessageRecord, RoomMessageData, Stream};

/// Query parameters for listing messages
#[derive(Debug, Deserialize)]
pub struct ListMessagesParams {
    /// Return only messages with offset greater than this cursor
    #[serde(default)]
    pub after: u64,
    /// Maximum number of messages to return (default: 100, max: 1000)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// GET /api/messages - Direct messages past an offset cursor
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMessagesParams>,
) -> impl IntoResponse {
    list_stream_messages(&state, Stream::Messages, &params)
}

/// GET /api/room-messages - Room messages past an offset cursor
pub async fn list_room_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMessagesParams>,
) -> impl IntoResponse {
    list_stream_messages(&state, Stream::RoomMessages, &params)
}

fn list_stream_messages(
    state: &AppState,
    stream: Stream,
    params: &ListMessagesParams,
) -> axum::response::Response {
    let events = match state.chat.event_log().read_after(stream, params.after) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error reading {} stream: {}", stream, e);
            let error = ApiError::internal(format!("failed to read {} stream", stream));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response();
        }
    };

    let total = events.len();
    let head = match stream {
        Stream::RoomMessages => state.chat.head_cursor().room_messages,
        _ => state.chat.head_cursor().messages,
    };

    let mut records = Vec::new();
    for event in events.iter().take(params.limit.min(1000)) {
        let record = match stream {
            Stream::RoomMessages => event.parse_data::<RoomMessageData>().map(|d| MessageRecord {
                offset: event.offset,
                content: d.content,
                sender: d.sender,
                receiver: d.receiver,
            }),
            _ => event.parse_data::<DirectMessageData>().map(|d| MessageRecord {
                offset: event.offset,
                content: d.content,
                sender: d.sender,
                receiver: d.receiver,
            }),
        };
        match record {
            Ok(record) => records.push(record),
            Err(e) => {
                eprintln!(
                    "Warning: skipping unreadable {} event {}: {}",
                    stream, event.offset, e
                );
            }
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::with_total(records, head, total)),
    )
        .into_response()
}
