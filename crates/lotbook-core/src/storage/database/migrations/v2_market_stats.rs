use rusqlite::Connection;

use super::Migration;
use crate::error::Result;

pub struct V2MarketStats;

impl Migration for V2MarketStats {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Add marketplace research columns to products table"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        let has_column: bool = conn
            .prepare("SELECT 1 FROM pragma_table_info('products') WHERE name='market_avg_sold'")?
            .exists([])?;

        if !has_column {
            conn.execute_batch(
                "
                ALTER TABLE products ADD COLUMN market_avg_sold     REAL;
                ALTER TABLE products ADD COLUMN market_sold_low     REAL;
                ALTER TABLE products ADD COLUMN market_sold_high    REAL;
                ALTER TABLE products ADD COLUMN market_sell_through REAL;
                ALTER TABLE products ADD COLUMN market_total_sold   INTEGER;
                ALTER TABLE products ADD COLUMN market_active_count INTEGER;
                ALTER TABLE products ADD COLUMN market_avg_list     REAL;
                ",
            )?;
        }
        Ok(())
    }
}
