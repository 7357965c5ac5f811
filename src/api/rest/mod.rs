//! REST API module for HTTP endpoints
//!
//! Provides read endpoints for client recovery and data access:
//! - `GET /api/users` - List registered users
//! - `GET /api/rooms` - List registered rooms
//! - `GET /api/rooms/:name` - Get single room
//! - `GET /api/messages` - List direct messages past an offset
//! - `GET /api/room-messages` - List room messages past an offset

pub mod messages;
pub mod rooms;
pub mod users;

use serde::{Deserialize, Serialize};

/// Common pagination parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    /// Maximum number of items to return (default: 100, max: 1000)
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of items to skip
    #[serde(default)]
    pub skip: usize,
}

fn default_limit() -> usize {
    100
}

impl PaginationParams {
    /// Normalize limit to max 1000
    pub fn normalized_limit(&self) -> usize {
        self.limit.min(1000)
    }
}

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Head offset of the stream at response time, a cursor seed
    pub head: u64,
    /// Total count (for paginated responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, head: u64) -> Self {
        Self {
            data,
            head,
            total: None,
        }
    }

    pub fn with_total(data: T, head: u64, total: usize) -> Self {
        Self {
            data,
            head,
            total: Some(total),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL_ERROR".to_string(),
        }
    }
}
