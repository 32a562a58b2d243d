//! Coin ledger: balance plus a capped transaction history.
//!
//! The balance is a single non-negative integer persisted under one key.
//! Every mutation appends a transaction; history is newest first and
//! capped at [`HISTORY_CAP`] entries.
//!
//! Reads fail open (absent or unreadable balance is 0). A debit never
//! proceeds without a confirmed sufficient balance, so a failed read
//! fails the debit.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError, ValidationError};
use crate::store::{self, keys, KvStore};

/// Maximum number of transactions retained, oldest evicted first.
pub const HISTORY_CAP: usize = 50;

/// Coin amounts awarded for each in-app accomplishment.
pub mod rewards {
    pub const POMODORO_COMPLETE: u64 = 10;
    pub const HOMEWORK_COMPLETE: u64 = 15;
    pub const DAILY_STREAK: u64 = 20;
    pub const LEVEL_UP: u64 = 50;
}

/// One ledger entry. `amount` is positive for credits, negative for debits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinTransaction {
    pub amount: i64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Coin balance and transaction history over the durable store.
///
/// Constructed once per process and passed to callers; every
/// read-modify-write runs under an internal lock so interleaved
/// mutations cannot lose an update.
pub struct CoinLedger {
    store: Arc<dyn KvStore>,
    write_lock: Mutex<()>,
}

impl CoinLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Current balance. Absent or unparsable values read as 0; a backend
    /// read failure is logged and also reads as 0.
    pub fn balance(&self) -> u64 {
        store::read_or_absent(self.store.as_ref(), keys::COIN_BALANCE)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    fn balance_checked(&self) -> Result<u64, StoreError> {
        Ok(self
            .store
            .get(keys::COIN_BALANCE)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0))
    }

    /// Add `amount` coins and log the transaction. Returns the new balance.
    ///
    /// # Errors
    /// Rejects a zero amount; propagates a failed balance write.
    pub fn credit(&self, amount: u64, reason: &str) -> Result<u64> {
        if amount == 0 {
            return Err(ValidationError::InvalidValue {
                field: "amount".into(),
                message: "credit amount must be positive".into(),
            }
            .into());
        }
        let _guard = self.mutation_guard();
        let new_total = self.balance().saturating_add(amount);
        self.store.set(keys::COIN_BALANCE, &new_total.to_string())?;
        self.log_transaction(amount as i64, reason);
        Ok(new_total)
    }

    /// Spend `amount` coins if the balance covers it.
    ///
    /// Returns `Ok(false)` and performs no mutation when funds are
    /// insufficient. A failed balance read fails the whole debit.
    pub fn debit(&self, amount: u64, reason: &str) -> Result<bool> {
        if amount == 0 {
            return Err(ValidationError::InvalidValue {
                field: "amount".into(),
                message: "debit amount must be positive".into(),
            }
            .into());
        }
        let _guard = self.mutation_guard();
        let current = self.balance_checked()?;
        if current < amount {
            return Ok(false);
        }
        self.store
            .set(keys::COIN_BALANCE, &(current - amount).to_string())?;
        self.log_transaction(-(amount as i64), reason);
        Ok(true)
    }

    /// Transaction history, newest first, at most [`HISTORY_CAP`] entries.
    pub fn history(&self) -> Vec<CoinTransaction> {
        store::read_or_absent(self.store.as_ref(), keys::COIN_HISTORY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// History logging is best-effort: a failure here must not undo the
    /// balance mutation it records.
    fn log_transaction(&self, amount: i64, reason: &str) {
        let mut history = self.history();
        history.insert(
            0,
            CoinTransaction {
                amount,
                reason: reason.to_string(),
                timestamp: Utc::now(),
            },
        );
        history.truncate(HISTORY_CAP);
        match serde_json::to_string(&history) {
            Ok(json) => store::write_best_effort(self.store.as_ref(), keys::COIN_HISTORY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to encode coin history"),
        }
    }

    fn mutation_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}
