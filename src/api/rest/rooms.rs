//! Room endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::{ApiError, ApiResponse, PaginationParams};
use crate::api::websocket::state::AppState;
use crate::types::RoomBrief;

/// GET /api/rooms - List registered rooms with pagination
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let rooms = state.chat.list_rooms();
    let total = rooms.len();
    let head = state.chat.head_cursor().rooms;

    let rooms: Vec<RoomBrief> = rooms
        .into_iter()
        .skip(params.skip)
        .take(params.normalized_limit())
        .collect();

    Json(ApiResponse::with_total(rooms, head, total))
}

/// GET /api/rooms/:name - Get a single room
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    // URL decode the name (handles spaces and special chars)
    let decoded_name = urlencoding::decode(&name)
        .unwrap_or_else(|_| name.clone().into())
        .into_owned();

    match state.chat.get_room(&decoded_name) {
        Some(room) => {
            let head = state.chat.head_cursor().rooms;
            (StatusCode::OK, Json(ApiResponse::new(room, head))).into_response()
        }
        None => {
            let error = ApiError::not_found(format!("Room '{}' not found", decoded_name));
            (StatusCode::NOT_FOUND, Json(error)).into_response()
        }
    }
}
