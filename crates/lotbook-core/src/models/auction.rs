use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AuctionId = i64;

/// One scraped auction event. Items belong to exactly one auction and are
/// purged with it when the auction closes and is cleaned up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub url: String,
    pub title: Option<String>,
    pub auctioneer: Option<String>,
    pub end_date: Option<String>,
    pub scrape_date: DateTime<Utc>,
    #[serde(default)]
    pub item_count: i64,
}
