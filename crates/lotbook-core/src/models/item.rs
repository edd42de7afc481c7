use serde::{Deserialize, Serialize};

use super::{AuctionId, ProductId};

pub type ItemId = i64;

/// An ephemeral per-listing record, scoped to one auction. Carries its own
/// scraped copies of the identity fields; linking never rewrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionItem {
    pub id: ItemId,
    pub auction_id: AuctionId,
    /// Nullable, mutable link to the canonical product.
    pub product_id: Option<ProductId>,
    pub lot: Option<String>,
    pub current_bid: f64,
    pub sold_price: f64,
    pub status: String,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub packaging: Option<String>,
    pub condition: Option<String>,
    pub functional: Option<String>,
    pub missing_parts: Option<String>,
    pub missing_parts_desc: Option<String>,
    pub damaged: Option<String>,
    pub damage_desc: Option<String>,
    pub item_notes: Option<String>,
    pub upc: Option<String>,
    pub asin: Option<String>,
    pub url: Option<String>,
    pub suggested_msrp: f64,
    pub scraped_category: Option<String>,
    pub is_watched: bool,
    pub is_hidden: bool,
    pub is_won: bool,
}

/// Scraped fields for inserting a new listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDraft {
    pub lot: Option<String>,
    pub current_bid: f64,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub packaging: Option<String>,
    pub condition: Option<String>,
    pub functional: Option<String>,
    pub missing_parts: Option<String>,
    pub missing_parts_desc: Option<String>,
    pub damaged: Option<String>,
    pub damage_desc: Option<String>,
    pub item_notes: Option<String>,
    pub upc: Option<String>,
    pub asin: Option<String>,
    pub url: Option<String>,
    pub suggested_msrp: f64,
    pub scraped_category: Option<String>,
}

/// The slice of an unlinked item the auto-linker cascades over.
#[derive(Debug, Clone)]
pub struct ItemKey {
    pub id: ItemId,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub upc: Option<String>,
    pub asin: Option<String>,
}

/// Display-time composition of an item: the linked product's identity fields
/// win, the item's scraped fields fill the gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub auction_id: AuctionId,
    pub product_id: Option<ProductId>,
    pub lot: Option<String>,
    pub current_bid: f64,
    pub sold_price: f64,
    pub status: String,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub upc: Option<String>,
    pub asin: Option<String>,
    pub category: Option<String>,
    pub master_msrp: Option<f64>,
    pub master_target_price: Option<f64>,
    pub shipping_cost_basis: Option<f64>,
    pub condition: Option<String>,
    pub is_won: bool,
}
