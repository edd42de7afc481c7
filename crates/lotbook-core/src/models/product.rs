use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProductId = i64;

/// A canonical master record: the single authoritative entry representing a
/// real-world item across many auction listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Unique across the catalog when non-empty.
    pub upc: Option<String>,
    /// Unique across the catalog when non-empty.
    pub asin: Option<String>,
    pub category: Option<String>,

    #[serde(default)]
    pub pricing: ProductPricing,

    #[serde(default)]
    pub physical: ProductPhysical,

    #[serde(default)]
    pub market: MarketStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub is_favorite: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPricing {
    pub msrp: Option<f64>,
    pub avg_sold_price: Option<f64>,
    pub target_list_price: Option<f64>,
    pub shipping_cost_basis: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPhysical {
    pub weight_lbs: Option<f64>,
    pub weight_oz: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Marketplace research figures gathered for a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketStats {
    pub avg_sold_price: Option<f64>,
    pub sold_range_low: Option<f64>,
    pub sold_range_high: Option<f64>,
    pub sell_through_rate: Option<f64>,
    pub total_sold_count: Option<i64>,
    pub active_count: Option<i64>,
    pub avg_list_price: Option<f64>,
}

impl Product {
    pub fn new() -> Self {
        Self {
            id: 0,
            title: None,
            brand: None,
            model: None,
            upc: None,
            asin: None,
            category: None,
            pricing: ProductPricing::default(),
            physical: ProductPhysical::default(),
            market: MarketStats::default(),
            notes: None,
            is_favorite: false,
            created_at: Utc::now(),
        }
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::new()
    }
}

/// The editable field set accepted by a save operation. `None` columns are
/// written as NULL; the draft is the whole form, not a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    /// Explicit target id, when the operator edits a known record.
    pub id: Option<ProductId>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub upc: Option<String>,
    pub asin: Option<String>,
    pub category: Option<String>,
    pub msrp: Option<f64>,
    pub avg_sold_price: Option<f64>,
    pub target_list_price: Option<f64>,
    pub shipping_cost_basis: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub weight_oz: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub notes: Option<String>,
}

/// The slice of a product the matching passes look at. One row per catalog
/// entry, loaded in a single scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub upc: Option<String>,
    pub asin: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub title: Option<String>,
}

/// Compact row for product listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummaryView {
    pub id: ProductId,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub upc: Option<String>,
    pub asin: Option<String>,
    pub linked_items: i64,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_has_no_identifiers() {
        let p = Product::new();
        assert!(p.upc.is_none());
        assert!(p.asin.is_none());
        assert!(!p.is_favorite);
    }

    #[test]
    fn draft_roundtrips_through_json() {
        let draft = ProductDraft {
            title: Some("Widget Pro".into()),
            msrp: Some(19.99),
            ..Default::default()
        };
        let json = serde_json::to_string(&draft).unwrap();
        let back: ProductDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title.as_deref(), Some("Widget Pro"));
        assert_eq!(back.msrp, Some(19.99));
    }
}
