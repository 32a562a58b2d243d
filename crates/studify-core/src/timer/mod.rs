mod controller;
mod engine;

pub use controller::{SessionCompletion, TimerController, TIMER_NOTIFICATION_ID};
pub use engine::{format_clock, PomodoroTimer, Restoration, StoredTimer, TimerMode, TimerPhase};
