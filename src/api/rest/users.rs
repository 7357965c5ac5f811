//! User endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use super::{ApiResponse, PaginationParams};
use crate::api::websocket::state::AppState;
use crate::types::UserBrief;

/// GET /api/users - List registered users with pagination
///
/// Credentials are not part of [`UserBrief`], so they cannot leak here.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let users = state.chat.list_users();
    let total = users.len();
    let head = state.chat.head_cursor().users;

    let users: Vec<UserBrief> = users
        .into_iter()
        .skip(params.skip)
        .take(params.normalized_limit())
        .collect();

    Json(ApiResponse::with_total(users, head, total))
}
