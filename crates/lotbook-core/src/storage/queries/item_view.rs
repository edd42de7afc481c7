use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::{AuctionId, ItemView};

/// Read-side composition of an item with its linked product. The product's
/// identity fields win; the item's scraped fields fill the gaps.
pub struct ItemViewQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ItemViewQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list_by_auction(&self, auction_id: AuctionId) -> Result<Vec<ItemView>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                i.id, i.auction_id, i.product_id, i.lot, i.current_bid, i.sold_price, i.status,
                COALESCE(p.title, i.title),
                COALESCE(p.brand, i.brand),
                COALESCE(p.model, i.model),
                COALESCE(p.upc, i.upc),
                COALESCE(p.asin, i.asin),
                COALESCE(p.category, i.scraped_category),
                p.msrp, p.target_list_price, p.shipping_cost_basis,
                i.condition, i.is_won
             FROM auction_items i
             LEFT JOIN products p ON i.product_id = p.id
             WHERE i.auction_id = ?1
             ORDER BY i.id",
        )?;

        let rows = stmt
            .query_map(params![auction_id], |row| {
                Ok(ItemView {
                    id: row.get(0)?,
                    auction_id: row.get(1)?,
                    product_id: row.get(2)?,
                    lot: row.get(3)?,
                    current_bid: row.get(4)?,
                    sold_price: row.get(5)?,
                    status: row.get(6)?,
                    title: row.get(7)?,
                    brand: row.get(8)?,
                    model: row.get(9)?,
                    upc: row.get(10)?,
                    asin: row.get(11)?,
                    category: row.get(12)?,
                    master_msrp: row.get(13)?,
                    master_target_price: row.get(14)?,
                    shipping_cost_basis: row.get(15)?,
                    condition: row.get(16)?,
                    is_won: row.get(17)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
