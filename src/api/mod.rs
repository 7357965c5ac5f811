//! API module for HTTP and WebSocket endpoints
//!
//! This module provides the WebSocket replay/live endpoint plus REST read
//! endpoints for recovery and data access.

pub mod http;
pub mod rest;
pub mod session;
pub mod websocket;
