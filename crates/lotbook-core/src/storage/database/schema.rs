use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS auctions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            url         TEXT UNIQUE NOT NULL,
            title       TEXT,
            auctioneer  TEXT,
            end_date    TEXT,
            scrape_date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS products (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            title               TEXT,
            brand               TEXT,
            model               TEXT,
            upc                 TEXT UNIQUE,
            asin                TEXT UNIQUE,
            category            TEXT,
            msrp                REAL,
            avg_sold_price      REAL,
            target_list_price   REAL,
            shipping_cost_basis REAL,
            weight_lbs          REAL,
            weight_oz           REAL,
            length              REAL,
            width               REAL,
            height              REAL,
            notes               TEXT,
            is_favorite         INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS auction_items (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            auction_id         INTEGER NOT NULL REFERENCES auctions(id) ON DELETE CASCADE,
            product_id         INTEGER REFERENCES products(id) ON DELETE SET NULL,
            lot                TEXT,
            current_bid        REAL NOT NULL DEFAULT 0,
            sold_price         REAL NOT NULL DEFAULT 0,
            status             TEXT NOT NULL DEFAULT 'Active',
            title              TEXT,
            brand              TEXT,
            model              TEXT,
            packaging          TEXT,
            condition          TEXT,
            functional         TEXT,
            missing_parts      TEXT,
            missing_parts_desc TEXT,
            damaged            TEXT,
            damage_desc        TEXT,
            item_notes         TEXT,
            upc                TEXT,
            asin               TEXT,
            url                TEXT,
            suggested_msrp     REAL NOT NULL DEFAULT 0,
            scraped_category   TEXT,
            is_watched         INTEGER NOT NULL DEFAULT 0,
            is_hidden          INTEGER NOT NULL DEFAULT 0,
            is_won             INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_products_upc      ON products(upc);
        CREATE INDEX IF NOT EXISTS idx_products_asin     ON products(asin);
        CREATE INDEX IF NOT EXISTS idx_products_created  ON products(created_at);
        CREATE INDEX IF NOT EXISTS idx_items_auction     ON auction_items(auction_id);
        CREATE INDEX IF NOT EXISTS idx_items_product     ON auction_items(product_id);
        ",
    )?;
    Ok(())
}

