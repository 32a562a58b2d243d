use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerPhase};

/// Every timer state change produces an Event.
/// The UI layer renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero. `mode` is the interval that finished.
    TimerCompleted {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// Manual work/break toggle while idle.
    ModeSwitched {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TimerPhase,
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
}
