//! Reward shop: a static catalog purchasable with earned coins.
//!
//! Owned item ids are persisted as a JSON array; purchases debit the
//! ledger and never leave partial state behind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ledger::CoinLedger;
use crate::store::{self, keys, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Theme,
    Boost,
    Decoration,
    Avatar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u64,
    pub category: ItemCategory,
}

/// Everything the shop sells.
pub fn catalog() -> &'static [ShopItem] {
    const ITEMS: &[ShopItem] = &[
        ShopItem {
            id: "theme_ocean",
            name: "Ocean Theme",
            description: "Cool blue color scheme",
            price: 100,
            category: ItemCategory::Theme,
        },
        ShopItem {
            id: "theme_forest",
            name: "Forest Theme",
            description: "Calming green aesthetic",
            price: 100,
            category: ItemCategory::Theme,
        },
        ShopItem {
            id: "theme_sunset",
            name: "Sunset Theme",
            description: "Warm orange and pink",
            price: 150,
            category: ItemCategory::Theme,
        },
        ShopItem {
            id: "boost_2x_coins",
            name: "2x Coin Boost",
            description: "Double coins for 24 hours",
            price: 200,
            category: ItemCategory::Boost,
        },
        ShopItem {
            id: "boost_focus",
            name: "Focus Boost",
            description: "Extended timer by 5 minutes",
            price: 150,
            category: ItemCategory::Boost,
        },
        ShopItem {
            id: "deco_plants",
            name: "Study Plants",
            description: "Decorative plants for your space",
            price: 80,
            category: ItemCategory::Decoration,
        },
        ShopItem {
            id: "deco_books",
            name: "Book Stack",
            description: "Decorative book collection",
            price: 60,
            category: ItemCategory::Decoration,
        },
        ShopItem {
            id: "avatar_hat",
            name: "Cool Hat",
            description: "Stylish hat for your cat",
            price: 120,
            category: ItemCategory::Avatar,
        },
        ShopItem {
            id: "avatar_glasses",
            name: "Study Glasses",
            description: "Smart glasses for your cat",
            price: 100,
            category: ItemCategory::Avatar,
        },
        ShopItem {
            id: "avatar_bow",
            name: "Cute Bow",
            description: "Adorable bow accessory",
            price: 80,
            category: ItemCategory::Avatar,
        },
    ];
    ITEMS
}

pub fn item(id: &str) -> Option<&'static ShopItem> {
    catalog().iter().find(|item| item.id == id)
}

/// Outcome of a purchase attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Purchased { remaining: u64 },
    AlreadyOwned,
    InsufficientFunds { short_by: u64 },
    UnknownItem,
}

pub struct Shop {
    store: Arc<dyn KvStore>,
    ledger: Arc<CoinLedger>,
}

impl Shop {
    pub fn new(store: Arc<dyn KvStore>, ledger: Arc<CoinLedger>) -> Self {
        Self { store, ledger }
    }

    pub fn owned(&self) -> Vec<String> {
        store::read_or_absent(self.store.as_ref(), keys::OWNED_ITEMS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn owns(&self, item_id: &str) -> bool {
        self.owned().iter().any(|owned| owned == item_id)
    }

    /// Debit the ledger and record ownership; nothing changes on any
    /// non-purchased outcome.
    pub fn purchase(&self, item_id: &str) -> Result<PurchaseOutcome> {
        let Some(item) = item(item_id) else {
            return Ok(PurchaseOutcome::UnknownItem);
        };
        if self.owns(item_id) {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }

        let balance = self.ledger.balance();
        if balance < item.price {
            return Ok(PurchaseOutcome::InsufficientFunds {
                short_by: item.price - balance,
            });
        }

        if !self
            .ledger
            .debit(item.price, &format!("Purchased: {}", item.name))?
        {
            // Balance moved under us between the check and the debit.
            let balance = self.ledger.balance();
            return Ok(PurchaseOutcome::InsufficientFunds {
                short_by: item.price.saturating_sub(balance),
            });
        }

        let mut owned = self.owned();
        owned.push(item_id.to_string());
        self.store
            .set(keys::OWNED_ITEMS, &serde_json::to_string(&owned)?)?;

        Ok(PurchaseOutcome::Purchased {
            remaining: self.ledger.balance(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct Fixture {
        shop: Shop,
        ledger: Arc<CoinLedger>,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let ledger = Arc::new(CoinLedger::new(store.clone()));
        Fixture {
            shop: Shop::new(store, ledger.clone()),
            ledger,
        }
    }

    #[test]
    fn purchase_debits_and_records_ownership() {
        let fx = fixture();
        fx.ledger.credit(100, "seed").unwrap();

        let outcome = fx.shop.purchase("deco_books").unwrap();
        assert_eq!(outcome, PurchaseOutcome::Purchased { remaining: 40 });
        assert!(fx.shop.owns("deco_books"));
        assert_eq!(fx.ledger.balance(), 40);
        assert_eq!(fx.ledger.history()[0].amount, -60);
    }

    #[test]
    fn repurchase_is_rejected_without_charge() {
        let fx = fixture();
        fx.ledger.credit(200, "seed").unwrap();
        fx.shop.purchase("deco_books").unwrap();

        assert_eq!(
            fx.shop.purchase("deco_books").unwrap(),
            PurchaseOutcome::AlreadyOwned
        );
        assert_eq!(fx.ledger.balance(), 140);
    }

    #[test]
    fn insufficient_funds_reports_shortfall() {
        let fx = fixture();
        fx.ledger.credit(50, "seed").unwrap();

        assert_eq!(
            fx.shop.purchase("theme_ocean").unwrap(),
            PurchaseOutcome::InsufficientFunds { short_by: 50 }
        );
        assert!(!fx.shop.owns("theme_ocean"));
        assert_eq!(fx.ledger.balance(), 50);
    }

    #[test]
    fn unknown_item_is_rejected() {
        let fx = fixture();
        assert_eq!(
            fx.shop.purchase("no_such_item").unwrap(),
            PurchaseOutcome::UnknownItem
        );
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = catalog().iter().map(|item| item.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }
}
