//! Collaborative study rooms over a hosted realtime database.
//!
//! The database itself owns replication and subscription delivery; this
//! module contributes only the room/member record shape and the update
//! rules applied to it. Every mutation is a full-document read followed
//! by a write.

mod db;
mod http;
mod service;
mod types;

pub use db::{MemoryRealtimeDb, RealtimeDb, Subscription};
pub use http::HttpRealtimeDb;
pub use service::{room_path, RoomService, ROOM_CODE_LEN};
pub use types::{format_minutes, StudyMember, StudyRoom};
