//! User-configurable timer durations.
//!
//! Stored as individual keys in the durable store. Out-of-range values
//! are rejected before any persistence. Observers registered on the
//! service fire after every successful save, so dependent screens react
//! to changes without polling.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::store::{self, keys, KvStore};

pub const DEFAULT_WORK_MIN: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MIN: u32 = 5;
pub const DEFAULT_LONG_BREAK_MIN: u32 = 15;

const WORK_RANGE: (u32, u32) = (1, 120);
const BREAK_RANGE: (u32, u32) = (1, 60);

/// Whole-minute interval lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    pub work_min: u32,
    pub short_break_min: u32,
    pub long_break_min: u32,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            work_min: DEFAULT_WORK_MIN,
            short_break_min: DEFAULT_SHORT_BREAK_MIN,
            long_break_min: DEFAULT_LONG_BREAK_MIN,
        }
    }
}

impl TimerDurations {
    /// # Errors
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("Work time", self.work_min, WORK_RANGE)?;
        check_range("Break time", self.short_break_min, BREAK_RANGE)?;
        check_range("Long break time", self.long_break_min, BREAK_RANGE)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}

type Observer = Box<dyn Fn(&TimerDurations) + Send>;

/// Settings service over the durable store.
pub struct Settings {
    store: Arc<dyn KvStore>,
    observers: Mutex<Vec<Observer>>,
}

impl Settings {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Current durations; absent or unparsable keys fall back to defaults.
    pub fn durations(&self) -> TimerDurations {
        let defaults = TimerDurations::default();
        TimerDurations {
            work_min: self.read_minutes(keys::WORK_MINUTES, defaults.work_min),
            short_break_min: self.read_minutes(keys::SHORT_BREAK_MINUTES, defaults.short_break_min),
            long_break_min: self.read_minutes(keys::LONG_BREAK_MINUTES, defaults.long_break_min),
        }
    }

    /// Validate and persist new durations, then notify observers.
    ///
    /// # Errors
    /// Out-of-range values are rejected with no state change.
    pub fn save(&self, durations: TimerDurations) -> Result<()> {
        durations.validate()?;
        self.store
            .set(keys::WORK_MINUTES, &durations.work_min.to_string())?;
        self.store
            .set(keys::SHORT_BREAK_MINUTES, &durations.short_break_min.to_string())?;
        self.store
            .set(keys::LONG_BREAK_MINUTES, &durations.long_break_min.to_string())?;
        self.notify(&durations);
        Ok(())
    }

    /// Restore the default durations.
    pub fn reset(&self) -> Result<TimerDurations> {
        let defaults = TimerDurations::default();
        self.save(defaults)?;
        Ok(defaults)
    }

    /// Delete every record in the durable store.
    pub fn clear_all_data(&self) -> Result<()> {
        self.store.clear()?;
        Ok(())
    }

    /// Register a callback fired after every successful save.
    pub fn subscribe(&self, observer: impl Fn(&TimerDurations) + Send + 'static) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(Box::new(observer));
        }
    }

    fn notify(&self, durations: &TimerDurations) {
        if let Ok(observers) = self.observers.lock() {
            for observer in observers.iter() {
                observer(durations);
            }
        }
    }

    fn read_minutes(&self, key: &str, default: u32) -> u32 {
        store::read_or_absent(self.store.as_ref(), key)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn settings() -> Settings {
        Settings::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings();
        assert_eq!(s.durations(), TimerDurations::default());
    }

    #[test]
    fn save_and_reload() {
        let s = settings();
        s.save(TimerDurations {
            work_min: 50,
            short_break_min: 10,
            long_break_min: 30,
        })
        .unwrap();
        let d = s.durations();
        assert_eq!(d.work_min, 50);
        assert_eq!(d.short_break_min, 10);
        assert_eq!(d.long_break_min, 30);
    }

    #[test]
    fn out_of_range_rejected_without_persisting() {
        let s = settings();
        let err = s
            .save(TimerDurations {
                work_min: 0,
                ..TimerDurations::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 120"));

        assert!(s
            .save(TimerDurations {
                short_break_min: 61,
                ..TimerDurations::default()
            })
            .is_err());
        assert!(s
            .save(TimerDurations {
                work_min: 121,
                ..TimerDurations::default()
            })
            .is_err());

        // Nothing was written by the rejected saves.
        assert_eq!(s.durations(), TimerDurations::default());
    }

    #[test]
    fn observers_fire_on_save() {
        let s = settings();
        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = Arc::clone(&seen);
        s.subscribe(move |d| {
            seen_clone.store(d.work_min, Ordering::SeqCst);
        });
        s.save(TimerDurations {
            work_min: 45,
            ..TimerDurations::default()
        })
        .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 45);
    }

    #[test]
    fn observers_do_not_fire_on_rejected_save() {
        let s = settings();
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = Arc::clone(&fired);
        s.subscribe(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        let _ = s.save(TimerDurations {
            work_min: 200,
            ..TimerDurations::default()
        });
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let s = settings();
        s.save(TimerDurations {
            work_min: 90,
            short_break_min: 20,
            long_break_min: 45,
        })
        .unwrap();
        s.reset().unwrap();
        assert_eq!(s.durations(), TimerDurations::default());
    }
}
