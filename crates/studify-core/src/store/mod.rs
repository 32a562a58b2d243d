//! Durable key-value storage boundary.
//!
//! Every on-device record (settings, counters, ledgers, the homework list)
//! goes through the [`KvStore`] trait. Production uses [`SqliteStore`];
//! tests use [`MemoryStore`].

mod sqlite;

pub use sqlite::{data_dir, SqliteStore};

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;

/// String keys under which the application persists its records.
pub mod keys {
    pub const COIN_BALANCE: &str = "coin_balance";
    pub const COIN_HISTORY: &str = "coin_history";
    pub const HOMEWORK_LIST: &str = "homework_list";
    pub const TIMER_STATE: &str = "timer_state";
    pub const TIMER_ENGINE: &str = "timer_engine";
    pub const COMPLETED_SESSIONS: &str = "completed_sessions";
    pub const CALENDAR_SESSIONS: &str = "calendar_sessions";
    pub const DAILY_APP_MINUTES: &str = "daily_app_minutes";
    pub const WORK_MINUTES: &str = "work_minutes";
    pub const SHORT_BREAK_MINUTES: &str = "short_break_minutes";
    pub const LONG_BREAK_MINUTES: &str = "long_break_minutes";
    pub const OWNED_ITEMS: &str = "owned_items";
    pub const WELCOME_SEEN: &str = "welcome_seen";
    pub const USER_ID: &str = "user_id";
    pub const USER_NAME: &str = "user_name";
    pub const PET_PROFILE: &str = "pet_profile";
}

/// Process-wide string-keyed persistent storage.
///
/// Values are plain strings or JSON-encoded records; interpretation is up
/// to the calling service.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store backing tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        entries.clear();
        Ok(())
    }
}

/// Read a key, treating storage failures and absent values alike.
///
/// Reads fail open: a backend error is logged and reported as `None`.
pub(crate) fn read_or_absent(store: &dyn KvStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, treating as absent");
            None
        }
    }
}

/// Best-effort write: failures are logged and swallowed.
pub(crate) fn write_best_effort(store: &dyn KvStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!(key, error = %e, "store write failed, dropping update");
    }
}
