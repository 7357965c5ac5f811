//! Durable Event Log Module
//!
//! This module provides the append-only storage layer:
//! - `EventLog`: per-stream JSONL logs with offset-ordered reads
//! - `EventLogConfig`: data directory layout
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌──────────────────┐    ┌───────────────────┐
//! │ ChatLog │───►│ append to        │───►│ fsync, return     │
//! │ op      │    │ <stream>.jsonl   │    │ assigned offset   │
//! └─────────┘    └──────────────────┘    └───────────────────┘
//!
//! Read Path (Reconnect):
//! ┌─────────────────────┐    ┌──────────────────────┐
//! │ read_after(stream,  │───►│ events with offset > │───► replayed to client
//! │ client cursor)      │    │ cursor, in order     │
//! └─────────────────────┘    └──────────────────────┘
//! ```

mod store;

pub use store::{EventLog, EventLogConfig, EventLogError, EventLogResult};
