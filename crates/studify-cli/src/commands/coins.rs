use clap::Subcommand;
use serde_json::json;

use crate::common;

#[derive(Subcommand)]
pub enum CoinsAction {
    /// Print the current balance
    Balance,
    /// Print the transaction history, newest first
    History,
    /// Add coins
    Credit {
        amount: u64,
        /// Reason recorded in the history
        #[arg(long, default_value = "Manual credit")]
        reason: String,
    },
    /// Spend coins; fails without mutating on insufficient funds
    Spend {
        amount: u64,
        #[arg(long, default_value = "Manual spend")]
        reason: String,
    },
}

pub fn run(action: CoinsAction) -> Result<(), Box<dyn std::error::Error>> {
    let services = common::open_services()?;

    match action {
        CoinsAction::Balance => {
            common::print_json(&json!({ "balance": services.ledger.balance() }))?;
        }
        CoinsAction::History => {
            common::print_json(&services.ledger.history())?;
        }
        CoinsAction::Credit { amount, reason } => {
            let balance = services.ledger.credit(amount, &reason)?;
            common::print_json(&json!({ "credited": amount, "balance": balance }))?;
        }
        CoinsAction::Spend { amount, reason } => {
            let spent = services.ledger.debit(amount, &reason)?;
            if !spent {
                eprintln!(
                    "not enough coins: balance is {}, needed {amount}",
                    services.ledger.balance()
                );
                std::process::exit(1);
            }
            common::print_json(&json!({ "spent": amount, "balance": services.ledger.balance() }))?;
        }
    }
    Ok(())
}
