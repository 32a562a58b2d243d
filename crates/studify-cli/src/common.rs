//! Shared service wiring for CLI commands.

use std::sync::Arc;

use studify_core::ledger::CoinLedger;
use studify_core::stats::Statistics;
use studify_core::store::{KvStore, SqliteStore};

/// The per-process service graph: one store, one ledger, one stats view.
pub struct Services {
    pub store: Arc<dyn KvStore>,
    pub ledger: Arc<CoinLedger>,
    pub stats: Arc<Statistics>,
}

pub fn open_services() -> Result<Services, Box<dyn std::error::Error>> {
    let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open()?);
    let ledger = Arc::new(CoinLedger::new(store.clone()));
    let stats = Arc::new(Statistics::new(store.clone()));
    Ok(Services {
        store,
        ledger,
        stats,
    })
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
