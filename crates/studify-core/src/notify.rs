//! Notification scheduling boundary.
//!
//! Delivery belongs to the OS notification service; the core only decides
//! what to schedule and when to cancel it. At most one timer-completion
//! notification and at most two per-homework notifications are live at a
//! time.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// External notification scheduler.
///
/// Implementations are stateless between calls; `id` is the caller's
/// handle for later cancellation.
pub trait Notifier: Send + Sync {
    fn schedule(
        &self,
        id: &str,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn cancel(&self, id: &str);
}

/// Discards every request. Used where no OS scheduler is available.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn schedule(
        &self,
        _id: &str,
        _fire_at: DateTime<Utc>,
        _title: &str,
        _body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn cancel(&self, _id: &str) {}
}

/// A scheduled notification as recorded by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNotification {
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Records schedule/cancel calls in memory. Backs the test suites.
#[derive(Default)]
pub struct MemoryNotifier {
    scheduled: Mutex<HashMap<String, ScheduledNotification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> HashMap<String, ScheduledNotification> {
        self.scheduled.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<ScheduledNotification> {
        self.scheduled
            .lock()
            .ok()
            .and_then(|s| s.get(id).cloned())
    }
}

impl Notifier for MemoryNotifier {
    fn schedule(
        &self,
        id: &str,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut scheduled = self
            .scheduled
            .lock()
            .map_err(|e| e.to_string())?;
        scheduled.insert(
            id.to_string(),
            ScheduledNotification {
                fire_at,
                title: title.to_string(),
                body: body.to_string(),
            },
        );
        Ok(())
    }

    fn cancel(&self, id: &str) {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            scheduled.remove(id);
        }
    }
}
