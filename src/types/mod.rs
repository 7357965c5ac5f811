//! Data types for the Chat Relay server
//!
//! This module contains all the core data structures used throughout the application.

mod event;
mod message;
mod participant;
mod room;
mod user;

pub use event::{
    DirectMessageData, Event, EventKind, ParticipantNotedData, RoomMessageData,
    RoomRegisteredData, Stream, UserRegisteredData,
};
pub use message::MessageRecord;
pub use participant::ParticipantRole;
pub use room::{RoomBrief, RoomRecord};
pub use user::{UserBrief, UserRecord};
