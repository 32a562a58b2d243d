//! Realtime database boundary.
//!
//! Documents are JSON values addressed by slash-separated paths. The
//! hosted service owns conflict resolution and delivery; this trait only
//! carries reads, writes and change subscriptions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::RoomError;

/// Change callback: receives the new document, or `None` on deletion.
pub type OnChange = Box<dyn Fn(Option<Value>) + Send + Sync + 'static>;

/// Hosted realtime database surface.
pub trait RealtimeDb: Send + Sync {
    fn read(&self, path: &str) -> Result<Option<Value>, RoomError>;
    fn write(&self, path: &str, doc: &Value) -> Result<(), RoomError>;
    /// Merge top-level fields into the document at `path`.
    fn update(&self, path: &str, fields: &Value) -> Result<(), RoomError>;
    fn delete(&self, path: &str) -> Result<(), RoomError>;
    /// Watch `path`; the callback fires with the current document
    /// immediately and again after every change. Dropping the returned
    /// guard tears the watch down.
    fn subscribe(&self, path: &str, on_change: OnChange) -> Result<Subscription, RoomError>;
}

/// Live-watch guard. Unsubscribes when dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Tear the watch down now instead of at drop.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

type Subscriber = (u64, Arc<OnChange>);

#[derive(Default)]
struct Inner {
    docs: HashMap<String, Value>,
    subscribers: HashMap<String, Vec<Subscriber>>,
    next_subscriber: u64,
}

/// In-process realtime database: push-notifies subscribers on every
/// mutation. Backs the test suites and offline sessions.
#[derive(Default)]
pub struct MemoryRealtimeDb {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRealtimeDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, path: &str) {
        // Snapshot the callbacks first so they run without the lock held.
        let (value, callbacks) = {
            let inner = match self.inner.lock() {
                Ok(inner) => inner,
                Err(_) => return,
            };
            let value = inner.docs.get(path).cloned();
            let callbacks: Vec<Arc<OnChange>> = inner
                .subscribers
                .get(path)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default();
            (value, callbacks)
        };
        for callback in callbacks {
            (*callback)(value.clone());
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, RoomError> {
        self.inner
            .lock()
            .map_err(|e| RoomError::Backend(e.to_string()))
    }
}

impl RealtimeDb for MemoryRealtimeDb {
    fn read(&self, path: &str) -> Result<Option<Value>, RoomError> {
        Ok(self.lock()?.docs.get(path).cloned())
    }

    fn write(&self, path: &str, doc: &Value) -> Result<(), RoomError> {
        self.lock()?.docs.insert(path.to_string(), doc.clone());
        self.notify(path);
        Ok(())
    }

    fn update(&self, path: &str, fields: &Value) -> Result<(), RoomError> {
        {
            let mut inner = self.lock()?;
            let doc = inner
                .docs
                .entry(path.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
            if let (Some(target), Some(source)) = (doc.as_object_mut(), fields.as_object()) {
                for (key, value) in source {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        self.notify(path);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), RoomError> {
        self.lock()?.docs.remove(path);
        self.notify(path);
        Ok(())
    }

    fn subscribe(&self, path: &str, on_change: OnChange) -> Result<Subscription, RoomError> {
        let callback = Arc::new(on_change);
        let id = {
            let mut inner = self.lock()?;
            let id = inner.next_subscriber;
            inner.next_subscriber += 1;
            inner
                .subscribers
                .entry(path.to_string())
                .or_default()
                .push((id, Arc::clone(&callback)));
            id
        };

        // Deliver the current document right away.
        let current = self.read(path)?;
        (*callback)(current);

        let inner = Arc::clone(&self.inner);
        let path = path.to_string();
        Ok(Subscription::new(move || {
            if let Ok(mut inner) = inner.lock() {
                if let Some(subs) = inner.subscribers.get_mut(&path) {
                    subs.retain(|(sub_id, _)| *sub_id != id);
                }
            }
        }))
    }
}
