//! Countdown state machine for alternating work/break intervals.
//!
//! The engine has no internal thread and no storage access -- the caller
//! invokes `tick()` once per elapsed second while Running and persists
//! the [`StoredTimer`] record between invocations.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle (completed)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Break,
}

impl TimerMode {
    pub fn flipped(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Wall-clock record persisted while the countdown is Running.
///
/// It must not exist in storage in any other phase; pause, reset and
/// completion delete it. Restoration recomputes the remainder from
/// `ends_at` so progress survives process suspension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTimer {
    pub mode: TimerMode,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_paused: bool,
}

/// Outcome of reconciling a persisted [`StoredTimer`] against the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Restoration {
    /// The countdown elapsed while the process was away; completion
    /// handling for the stored mode must run exactly once.
    Completed(TimerMode),
    /// The countdown is still in flight; the engine is Running again.
    Resumed {
        mode: TimerMode,
        remaining_secs: u64,
    },
    /// The record should not have been persisted (inactive or paused).
    Stale,
}

/// Core countdown engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroTimer {
    mode: TimerMode,
    phase: TimerPhase,
    remaining_secs: u64,
    work_min: u32,
    break_min: u32,
}

impl PomodoroTimer {
    /// Create an idle work-mode timer from configured whole-minute durations.
    pub fn new(work_min: u32, break_min: u32) -> Self {
        Self {
            mode: TimerMode::Work,
            phase: TimerPhase::Idle,
            remaining_secs: u64::from(work_min) * 60,
            work_min,
            break_min,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Full configured length of the current mode, in seconds.
    pub fn total_secs(&self) -> u64 {
        self.configured_secs(self.mode)
    }

    /// `MM:SS` countdown display.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            display: self.display(),
            at: Utc::now(),
        }
    }

    /// Record to persist, present only while Running.
    pub fn stored_state(&self, now: DateTime<Utc>) -> Option<StoredTimer> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        Some(StoredTimer {
            mode: self.mode,
            started_at: now,
            ends_at: now + chrono::Duration::seconds(self.remaining_secs as i64),
            is_active: true,
            is_paused: false,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Idle | TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                Some(Event::TimerStarted {
                    mode: self.mode,
                    duration_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerPhase::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Running => {
                self.phase = TimerPhase::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                Some(Event::TimerResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Back to Idle with the configured duration for the current mode.
    pub fn reset(&mut self) -> Option<Event> {
        self.phase = TimerPhase::Idle;
        self.remaining_secs = self.total_secs();
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::TimerCompleted)` when the interval finishes;
    /// the engine is then Idle in the opposite mode, awaiting an explicit
    /// start.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            let finished = self.finish_current();
            return Some(Event::TimerCompleted {
                mode: finished,
                at: Utc::now(),
            });
        }
        None
    }

    /// Manual work/break toggle. Rejected while a countdown is active.
    pub fn switch_mode(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Idle {
            return None;
        }
        self.mode = self.mode.flipped();
        self.remaining_secs = self.total_secs();
        Some(Event::ModeSwitched {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Adopt new configured durations. An idle countdown is refreshed to
    /// the new length; an active one keeps its remainder.
    pub fn set_durations(&mut self, work_min: u32, break_min: u32) {
        self.work_min = work_min;
        self.break_min = break_min;
        if self.phase == TimerPhase::Idle {
            self.remaining_secs = self.total_secs();
        }
    }

    /// Reconcile a persisted record against the clock at process start.
    pub fn restore(&mut self, stored: &StoredTimer, now: DateTime<Utc>) -> Restoration {
        if !stored.is_active || stored.is_paused {
            return Restoration::Stale;
        }
        let remaining = (stored.ends_at - now).num_seconds().max(0) as u64;
        self.mode = stored.mode;
        if remaining == 0 {
            let finished = self.finish_current();
            Restoration::Completed(finished)
        } else {
            self.phase = TimerPhase::Running;
            self.remaining_secs = remaining;
            Restoration::Resumed {
                mode: stored.mode,
                remaining_secs: remaining,
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn configured_secs(&self, mode: TimerMode) -> u64 {
        let minutes = match mode {
            TimerMode::Work => self.work_min,
            TimerMode::Break => self.break_min,
        };
        u64::from(minutes) * 60
    }

    /// Flip to the opposite mode, Idle, with its configured duration.
    /// Returns the mode that just finished.
    fn finish_current(&mut self) -> TimerMode {
        let finished = self.mode;
        self.mode = self.mode.flipped();
        self.phase = TimerPhase::Idle;
        self.remaining_secs = self.total_secs();
        finished
    }
}

/// `MM:SS` rendering of a second count.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
