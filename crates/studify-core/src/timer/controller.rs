//! Glue between the countdown engine, the durable store, the coin
//! ledger, the statistics counters and the notification scheduler.
//!
//! Owns the lifecycle of the persisted [`StoredTimer`] record (written on
//! start/resume, overwritten every tick, deleted on pause/reset/
//! completion) and of the single outstanding completion notification.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::engine::{PomodoroTimer, Restoration, StoredTimer, TimerMode, TimerPhase};
use crate::error::Result;
use crate::events::Event;
use crate::ledger::{rewards, CoinLedger};
use crate::notify::Notifier;
use crate::settings::TimerDurations;
use crate::stats::Statistics;
use crate::store::{keys, KvStore};

/// Identifier of the single timer-completion notification.
pub const TIMER_NOTIFICATION_ID: &str = "timer_complete";

/// What happened when an interval finished.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCompletion {
    pub mode: TimerMode,
    pub coins_awarded: u64,
    pub balance: u64,
    pub sessions_today: u32,
}

pub struct TimerController {
    engine: PomodoroTimer,
    store: Arc<dyn KvStore>,
    notifier: Arc<dyn Notifier>,
    ledger: Arc<CoinLedger>,
    stats: Arc<Statistics>,
}

impl TimerController {
    pub fn new(
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn Notifier>,
        ledger: Arc<CoinLedger>,
        stats: Arc<Statistics>,
        durations: TimerDurations,
    ) -> Self {
        Self {
            engine: PomodoroTimer::new(durations.work_min, durations.short_break_min),
            store,
            notifier,
            ledger,
            stats,
        }
    }

    /// Rebuild around a previously serialized engine (CLI continuity).
    pub fn with_engine(
        engine: PomodoroTimer,
        store: Arc<dyn KvStore>,
        notifier: Arc<dyn Notifier>,
        ledger: Arc<CoinLedger>,
        stats: Arc<Statistics>,
    ) -> Self {
        Self {
            engine,
            store,
            notifier,
            ledger,
            stats,
        }
    }

    pub fn engine(&self) -> &PomodoroTimer {
        &self.engine
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    /// Adopt new configured durations (fired from the settings observer).
    pub fn apply_durations(&mut self, durations: &TimerDurations) {
        self.engine
            .set_durations(durations.work_min, durations.short_break_min);
    }

    /// Reconcile a persisted countdown against the wall clock.
    ///
    /// Call once at process start. If the countdown elapsed while the
    /// process was away, completion handling runs exactly once and its
    /// outcome is returned.
    pub fn restore(&mut self) -> Result<Option<SessionCompletion>> {
        let raw = match self.store.get(keys::TIMER_STATE)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let stored: StoredTimer = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable timer record");
                self.store.remove(keys::TIMER_STATE)?;
                return Ok(None);
            }
        };
        match self.engine.restore(&stored, Utc::now()) {
            Restoration::Stale => {
                self.store.remove(keys::TIMER_STATE)?;
                Ok(None)
            }
            Restoration::Completed(mode) => {
                let completion = self.handle_completion(mode)?;
                Ok(Some(completion))
            }
            Restoration::Resumed { .. } => Ok(None),
        }
    }

    pub fn start(&mut self) -> Result<Option<Event>> {
        let event = self.engine.start();
        if event.is_some() {
            self.begin_running()?;
        }
        Ok(event)
    }

    pub fn pause(&mut self) -> Result<Option<Event>> {
        let event = self.engine.pause();
        if event.is_some() {
            self.store.remove(keys::TIMER_STATE)?;
            self.notifier.cancel(TIMER_NOTIFICATION_ID);
        }
        Ok(event)
    }

    pub fn resume(&mut self) -> Result<Option<Event>> {
        let event = self.engine.resume();
        if event.is_some() {
            self.begin_running()?;
        }
        Ok(event)
    }

    pub fn reset(&mut self) -> Result<Option<Event>> {
        let event = self.engine.reset();
        self.store.remove(keys::TIMER_STATE)?;
        self.notifier.cancel(TIMER_NOTIFICATION_ID);
        Ok(event)
    }

    /// Manual work/break toggle while idle.
    pub fn switch_mode(&mut self) -> Option<Event> {
        self.engine.switch_mode()
    }

    /// Advance the countdown by one second.
    ///
    /// While Running, the persisted record is refreshed; on reaching
    /// zero, completion handling runs and its outcome is returned.
    pub fn tick(&mut self) -> Result<Option<SessionCompletion>> {
        match self.engine.tick() {
            Some(Event::TimerCompleted { mode, .. }) => {
                let completion = self.handle_completion(mode)?;
                Ok(Some(completion))
            }
            _ => {
                if self.engine.phase() == TimerPhase::Running {
                    self.persist_running_state()?;
                }
                Ok(None)
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Persist the running record and (re)schedule the completion
    /// notification, canceling any previously scheduled one first.
    fn begin_running(&mut self) -> Result<()> {
        self.persist_running_state()?;
        self.notifier.cancel(TIMER_NOTIFICATION_ID);
        if let Some(stored) = self.engine.stored_state(Utc::now()) {
            let (title, body) = match stored.mode {
                TimerMode::Work => (
                    "Work session complete",
                    "Great job! Time for a break. +10 coins earned.",
                ),
                TimerMode::Break => ("Break complete", "Ready to get back to work?"),
            };
            if let Err(e) =
                self.notifier
                    .schedule(TIMER_NOTIFICATION_ID, stored.ends_at, title, body)
            {
                tracing::warn!(error = %e, "failed to schedule completion notification");
            }
        }
        Ok(())
    }

    fn persist_running_state(&self) -> Result<()> {
        if let Some(stored) = self.engine.stored_state(Utc::now()) {
            self.store
                .set(keys::TIMER_STATE, &serde_json::to_string(&stored)?)?;
        }
        Ok(())
    }

    /// A countdown reached zero: clear the record and notification, and
    /// for a finished work interval bump the counters and pay the reward.
    fn handle_completion(&mut self, mode: TimerMode) -> Result<SessionCompletion> {
        self.store.remove(keys::TIMER_STATE)?;
        self.notifier.cancel(TIMER_NOTIFICATION_ID);

        let today = Utc::now().date_naive();
        let (coins_awarded, balance) = match mode {
            TimerMode::Work => {
                self.stats.increment_completed_sessions()?;
                self.stats.record_session_on(today)?;
                let balance = self
                    .ledger
                    .credit(rewards::POMODORO_COMPLETE, "Completed focus session")?;
                (rewards::POMODORO_COMPLETE, balance)
            }
            TimerMode::Break => (0, self.ledger.balance()),
        };

        Ok(SessionCompletion {
            mode,
            coins_awarded,
            balance,
            sessions_today: self.stats.sessions_on(today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        notifier: Arc<MemoryNotifier>,
        ledger: Arc<CoinLedger>,
        stats: Arc<Statistics>,
    }

    impl Fixture {
        fn new() -> Self {
            let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
            let kv: Arc<dyn KvStore> = store.clone();
            Self {
                store,
                notifier: Arc::new(MemoryNotifier::new()),
                ledger: Arc::new(CoinLedger::new(kv.clone())),
                stats: Arc::new(Statistics::new(kv)),
            }
        }

        fn controller(&self) -> TimerController {
            TimerController::new(
                self.store.clone(),
                self.notifier.clone(),
                self.ledger.clone(),
                self.stats.clone(),
                TimerDurations::default(),
            )
        }
    }

    #[test]
    fn start_persists_record_and_schedules_notification() {
        let fx = Fixture::new();
        let mut ctl = fx.controller();
        ctl.start().unwrap();

        assert!(fx.store.get(keys::TIMER_STATE).unwrap().is_some());
        let pending = fx.notifier.get(TIMER_NOTIFICATION_ID).unwrap();
        assert_eq!(pending.title, "Work session complete");
    }

    #[test]
    fn pause_deletes_record_and_cancels_notification() {
        let fx = Fixture::new();
        let mut ctl = fx.controller();
        ctl.start().unwrap();
        ctl.pause().unwrap();

        assert!(fx.store.get(keys::TIMER_STATE).unwrap().is_none());
        assert!(fx.notifier.get(TIMER_NOTIFICATION_ID).is_none());
    }

    #[test]
    fn work_completion_pays_once_and_counts_once() {
        let fx = Fixture::new();
        let mut ctl = fx.controller();
        ctl.start().unwrap();

        let mut completions = Vec::new();
        for _ in 0..1500 {
            if let Some(done) = ctl.tick().unwrap() {
                completions.push(done);
            }
        }
        assert_eq!(completions.len(), 1);
        let done = &completions[0];
        assert_eq!(done.mode, TimerMode::Work);
        assert_eq!(done.coins_awarded, 10);
        assert_eq!(done.balance, 10);
        assert_eq!(done.sessions_today, 1);

        assert_eq!(fx.ledger.balance(), 10);
        assert_eq!(fx.stats.completed_sessions(), 1);
        assert_eq!(fx.stats.sessions_on(Utc::now().date_naive()), 1);
        assert!(fx.store.get(keys::TIMER_STATE).unwrap().is_none());
        assert!(fx.notifier.get(TIMER_NOTIFICATION_ID).is_none());
    }

    #[test]
    fn break_completion_pays_nothing() {
        let fx = Fixture::new();
        let mut ctl = fx.controller();
        ctl.switch_mode();
        ctl.start().unwrap();
        let mut completion = None;
        for _ in 0..(5 * 60) {
            if let Some(done) = ctl.tick().unwrap() {
                completion = Some(done);
            }
        }
        let done = completion.expect("break should complete");
        assert_eq!(done.mode, TimerMode::Break);
        assert_eq!(done.coins_awarded, 0);
        assert_eq!(fx.ledger.balance(), 0);
        assert_eq!(fx.stats.completed_sessions(), 0);
    }

    #[test]
    fn restore_past_deadline_completes_exactly_once() {
        let fx = Fixture::new();
        let stored = StoredTimer {
            mode: TimerMode::Work,
            started_at: Utc::now() - chrono::Duration::seconds(1510),
            ends_at: Utc::now() - chrono::Duration::seconds(10),
            is_active: true,
            is_paused: false,
        };
        fx.store
            .set(keys::TIMER_STATE, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let mut ctl = fx.controller();
        let done = ctl.restore().unwrap().expect("elapsed countdown completes");
        assert_eq!(done.mode, TimerMode::Work);
        assert_eq!(fx.ledger.balance(), 10);
        assert_eq!(fx.stats.completed_sessions(), 1);

        // A second reconciliation sees no record and does nothing.
        assert!(ctl.restore().unwrap().is_none());
        assert_eq!(fx.ledger.balance(), 10);
        assert_eq!(fx.stats.completed_sessions(), 1);
    }

    #[test]
    fn restore_mid_countdown_resumes_running() {
        let fx = Fixture::new();
        let stored = StoredTimer {
            mode: TimerMode::Work,
            started_at: Utc::now(),
            ends_at: Utc::now() + chrono::Duration::seconds(600),
            is_active: true,
            is_paused: false,
        };
        fx.store
            .set(keys::TIMER_STATE, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let mut ctl = fx.controller();
        assert!(ctl.restore().unwrap().is_none());
        assert_eq!(ctl.engine().phase(), TimerPhase::Running);
        assert!(ctl.engine().remaining_secs() <= 600);
        assert!(ctl.engine().remaining_secs() > 590);
    }

    #[test]
    fn stale_paused_record_is_discarded() {
        let fx = Fixture::new();
        let stored = StoredTimer {
            mode: TimerMode::Work,
            started_at: Utc::now(),
            ends_at: Utc::now() + chrono::Duration::seconds(600),
            is_active: true,
            is_paused: true,
        };
        fx.store
            .set(keys::TIMER_STATE, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let mut ctl = fx.controller();
        assert!(ctl.restore().unwrap().is_none());
        assert!(fx.store.get(keys::TIMER_STATE).unwrap().is_none());
        assert_eq!(ctl.engine().phase(), TimerPhase::Idle);
    }
}
