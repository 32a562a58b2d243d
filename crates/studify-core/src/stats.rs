//! Session counters, per-day calendar counts, streaks and app usage.
//!
//! The calendar maps ISO day strings to completed work-session counts and
//! is increment-only; the streak is the run of consecutive trailing days
//! (ending today) with at least one session.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::Result;
use crate::store::{self, keys, KvStore};

const DAY_FORMAT: &str = "%Y-%m-%d";

fn day_key(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Counters and per-day statistics over the durable store.
pub struct Statistics {
    store: Arc<dyn KvStore>,
}

impl Statistics {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    // ── Completed-session counter ────────────────────────────────────

    pub fn completed_sessions(&self) -> u64 {
        store::read_or_absent(self.store.as_ref(), keys::COMPLETED_SESSIONS)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    pub fn increment_completed_sessions(&self) -> Result<u64> {
        let next = self.completed_sessions() + 1;
        self.store
            .set(keys::COMPLETED_SESSIONS, &next.to_string())?;
        Ok(next)
    }

    // ── Calendar session counts ──────────────────────────────────────

    /// All per-day counts, keyed by ISO day string.
    pub fn calendar(&self) -> BTreeMap<String, u32> {
        store::read_or_absent(self.store.as_ref(), keys::CALENDAR_SESSIONS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn sessions_on(&self, date: NaiveDate) -> u32 {
        self.calendar().get(&day_key(date)).copied().unwrap_or(0)
    }

    /// Record one completed work session on `date`. Increment-only.
    pub fn record_session_on(&self, date: NaiveDate) -> Result<()> {
        let mut calendar = self.calendar();
        *calendar.entry(day_key(date)).or_insert(0) += 1;
        self.store
            .set(keys::CALENDAR_SESSIONS, &serde_json::to_string(&calendar)?)?;
        Ok(())
    }

    /// Consecutive trailing days with at least one session, ending at
    /// `today`.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let calendar = self.calendar();
        let mut streak = 0;
        loop {
            let date = match today.checked_sub_days(chrono::Days::new(u64::from(streak))) {
                Some(d) => d,
                None => break,
            };
            if calendar.get(&day_key(date)).copied().unwrap_or(0) > 0 {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }

    // ── App usage ────────────────────────────────────────────────────

    /// Add foreground minutes to `date`'s usage total.
    pub fn record_app_usage(&self, date: NaiveDate, minutes: u32) -> Result<()> {
        let mut usage: BTreeMap<String, u32> =
            store::read_or_absent(self.store.as_ref(), keys::DAILY_APP_MINUTES)
                .and_then(|raw| serde_json::from_str(&raw).ok())
                .unwrap_or_default();
        *usage.entry(day_key(date)).or_insert(0) += minutes;
        self.store
            .set(keys::DAILY_APP_MINUTES, &serde_json::to_string(&usage)?)?;
        Ok(())
    }

    pub fn app_usage_on(&self, date: NaiveDate) -> u32 {
        store::read_or_absent(self.store.as_ref(), keys::DAILY_APP_MINUTES)
            .and_then(|raw| serde_json::from_str::<BTreeMap<String, u32>>(&raw).ok())
            .and_then(|usage| usage.get(&day_key(date)).copied())
            .unwrap_or(0)
    }

    // ── Derived totals ───────────────────────────────────────────────

    /// Total study minutes: every calendar session at the configured work
    /// length.
    pub fn total_study_minutes(&self, work_min: u32) -> u64 {
        let sessions: u64 = self.calendar().values().map(|&c| u64::from(c)).sum();
        sessions * u64::from(work_min)
    }

    /// Total break minutes: every completed session followed by one
    /// configured break.
    pub fn total_break_minutes(&self, break_min: u32) -> u64 {
        self.completed_sessions() * u64::from(break_min)
    }
}
