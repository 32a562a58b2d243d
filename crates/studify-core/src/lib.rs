//! # Studify Core Library
//!
//! This library provides the core business logic for Studify, a student
//! productivity app combining a Pomodoro-style session timer, a homework
//! tracker, a coin reward ledger and collaborative study rooms. The UI
//! shells (mobile, CLI) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Session Timer**: a wall-clock-aware countdown state machine that
//!   requires the caller to invoke `tick()` once per second
//! - **Storage**: every on-device record goes through the [`KvStore`]
//!   trait (SQLite-backed in production)
//! - **Ledger**: coin balance plus a capped transaction history
//! - **Rooms**: record shape and update rules over a hosted realtime
//!   database boundary
//!
//! ## Key Components
//!
//! - [`TimerController`]: countdown plus completion side effects
//! - [`CoinLedger`]: balance, credits, debits, history
//! - [`HomeworkStore`]: due-date-sorted task records with reminders
//! - [`RoomService`]: study-room membership and time aggregation

pub mod assistant;
pub mod config;
pub mod error;
pub mod events;
pub mod homework;
pub mod identity;
pub mod ledger;
pub mod notify;
pub mod pet;
pub mod room;
pub mod settings;
pub mod shop;
pub mod stats;
pub mod store;
pub mod timer;

pub use assistant::{AssistantClient, ChatMessage, ChatRole};
pub use config::{AppConfig, AssistantConfig, RoomConfig};
pub use error::{AssistantError, CoreError, RoomError, StoreError, ValidationError};
pub use events::Event;
pub use homework::{HomeworkItem, HomeworkStore, NewHomework, Priority};
pub use identity::Identity;
pub use ledger::{CoinLedger, CoinTransaction};
pub use notify::{MemoryNotifier, Notifier, NullNotifier};
pub use pet::{PetProfile, PetTracker};
pub use room::{HttpRealtimeDb, MemoryRealtimeDb, RealtimeDb, RoomService, StudyMember, StudyRoom};
pub use settings::{Settings, TimerDurations};
pub use shop::{PurchaseOutcome, Shop};
pub use stats::Statistics;
pub use store::{KvStore, MemoryStore, SqliteStore};
pub use timer::{
    PomodoroTimer, SessionCompletion, StoredTimer, TimerController, TimerMode, TimerPhase,
};
