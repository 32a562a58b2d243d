use clap::Subcommand;
use serde_json::json;
use studify_core::shop::{catalog, PurchaseOutcome, Shop};

use crate::common;

#[derive(Subcommand)]
pub enum ShopAction {
    /// Print the catalog
    List,
    /// Print owned item ids
    Owned,
    /// Buy an item by id
    Buy { id: String },
}

pub fn run(action: ShopAction) -> Result<(), Box<dyn std::error::Error>> {
    let services = common::open_services()?;
    let shop = Shop::new(services.store.clone(), services.ledger.clone());

    match action {
        ShopAction::List => {
            common::print_json(&catalog())?;
        }
        ShopAction::Owned => {
            common::print_json(&json!({ "owned": shop.owned() }))?;
        }
        ShopAction::Buy { id } => {
            let outcome = shop.purchase(&id)?;
            common::print_json(&outcome)?;
            if !matches!(outcome, PurchaseOutcome::Purchased { .. }) {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
