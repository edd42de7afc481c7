use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    pub products: usize,
    pub auctions: usize,
    pub items: usize,
    pub linked_items: usize,
}

pub struct CatalogStatsQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CatalogStatsQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn gather(&self) -> Result<CatalogStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(CatalogStats {
            products: count("SELECT COUNT(*) FROM products")?,
            auctions: count("SELECT COUNT(*) FROM auctions")?,
            items: count("SELECT COUNT(*) FROM auction_items")?,
            linked_items: count(
                "SELECT COUNT(*) FROM auction_items WHERE product_id IS NOT NULL",
            )?,
        })
    }
}
