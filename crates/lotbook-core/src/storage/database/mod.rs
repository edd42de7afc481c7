mod connection;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use migrations::{Migration, get_applied_versions, run_migrations};
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{LotbookError, Result};
use crate::models::{
    Auction, AuctionId, AuctionItem, ItemDraft, ItemId, ItemView, Product, ProductId,
    ProductSummaryView,
};

use super::queries::{CatalogStats, CatalogStatsQuery, ItemViewQuery};
use super::repositories::{
    AuctionRepository, ItemRepository, ProductRepository, Repository, SqliteAuctionRepository,
    SqliteItemRepository, SqliteProductRepository,
};

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// Facade over the pool for single-statement operations. Compound operations
/// (merge, upsert) take `connection()` and run their own transaction.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn connection(&self) -> std::sync::MutexGuard<'_, rusqlite::Connection> {
        self.pool.get_connection()
    }

    pub fn path(&self) -> Option<&str> {
        self.pool.path()
    }

    // ─── Products ──────────────────────────────────────────

    pub fn get_product(&self, id: ProductId) -> Result<Product> {
        let conn = self.pool.get_connection();
        let repo = SqliteProductRepository::new(&conn);
        repo.find_by_id(&id)?
            .ok_or(LotbookError::ProductNotFound(id))
    }

    pub fn list_products(&self, limit: usize, offset: usize) -> Result<Vec<ProductSummaryView>> {
        let conn = self.pool.get_connection();
        let repo = SqliteProductRepository::new(&conn);
        repo.list(limit, offset)
    }

    pub fn count_products(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        let repo = SqliteProductRepository::new(&conn);
        repo.count()
    }

    /// Deletes a product and nulls out every item link pointing at it.
    pub fn delete_product(&self, id: ProductId) -> Result<()> {
        let conn = self.pool.get_connection();
        let tx = conn.unchecked_transaction()?;
        {
            let items = SqliteItemRepository::new(&tx);
            items.clear_product_links(id)?;
            let products = SqliteProductRepository::new(&tx);
            if !products.delete(&id)? {
                return Err(LotbookError::ProductNotFound(id));
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn list_orphan_products(&self, cutoff: DateTime<Utc>) -> Result<Vec<ProductSummaryView>> {
        let conn = self.pool.get_connection();
        let repo = SqliteProductRepository::new(&conn);
        repo.list_orphans(cutoff)
    }

    // ─── Auctions ──────────────────────────────────────────

    pub fn insert_auction(&self, url: &str) -> Result<AuctionId> {
        let conn = self.pool.get_connection();
        let repo = SqliteAuctionRepository::new(&conn);
        repo.insert(url)
    }

    pub fn update_auction_metadata(
        &self,
        id: AuctionId,
        title: &str,
        auctioneer: &str,
        end_date: &str,
    ) -> Result<()> {
        let conn = self.pool.get_connection();
        let repo = SqliteAuctionRepository::new(&conn);
        repo.update_metadata(id, title, auctioneer, end_date)
    }

    pub fn get_auction(&self, id: AuctionId) -> Result<Auction> {
        let conn = self.pool.get_connection();
        let repo = SqliteAuctionRepository::new(&conn);
        repo.find_by_id(&id)?
            .ok_or(LotbookError::AuctionNotFound(id))
    }

    pub fn list_auctions(&self) -> Result<Vec<Auction>> {
        let conn = self.pool.get_connection();
        let repo = SqliteAuctionRepository::new(&conn);
        repo.list()
    }

    // ─── Items ─────────────────────────────────────────────

    pub fn insert_item(&self, auction_id: AuctionId, draft: &ItemDraft) -> Result<ItemId> {
        let conn = self.pool.get_connection();
        let repo = SqliteItemRepository::new(&conn);
        repo.insert(auction_id, draft)
    }

    pub fn get_item(&self, id: ItemId) -> Result<AuctionItem> {
        let conn = self.pool.get_connection();
        let repo = SqliteItemRepository::new(&conn);
        repo.find_by_id(&id)?.ok_or(LotbookError::ItemNotFound(id))
    }

    pub fn list_item_views(&self, auction_id: AuctionId) -> Result<Vec<ItemView>> {
        let conn = self.pool.get_connection();
        let query = ItemViewQuery::new(&conn);
        query.list_by_auction(auction_id)
    }

    pub fn record_final_price(
        &self,
        auction_id: AuctionId,
        lot: &str,
        sold_price: f64,
        status: &str,
    ) -> Result<usize> {
        let conn = self.pool.get_connection();
        let repo = SqliteItemRepository::new(&conn);
        repo.record_final_price(auction_id, lot, sold_price, status)
    }

    // ─── Stats ─────────────────────────────────────────────

    pub fn stats(&self) -> Result<CatalogStats> {
        let conn = self.pool.get_connection();
        let query = CatalogStatsQuery::new(&conn);
        query.gather()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductDraft;
    use crate::storage::repositories::ProductRepository as _;

    #[test]
    fn migrations_apply_once() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let versions = get_applied_versions(&conn).unwrap();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(versions.len() as u32, SCHEMA_VERSION);
        run_migrations(&conn).unwrap();
        assert_eq!(get_applied_versions(&conn).unwrap(), vec![1, 2]);
    }

    #[test]
    fn product_insert_and_fetch() {
        let db = Database::open_in_memory().unwrap();
        let id = {
            let conn = db.connection();
            let repo = SqliteProductRepository::new(&conn);
            repo.insert(&ProductDraft {
                title: Some("Cordless Drill".into()),
                brand: Some("DeWalt".into()),
                upc: Some("885911234567".into()),
                msrp: Some(129.0),
                ..Default::default()
            })
            .unwrap()
        };

        let product = db.get_product(id).unwrap();
        assert_eq!(product.title.as_deref(), Some("Cordless Drill"));
        assert_eq!(product.upc.as_deref(), Some("885911234567"));
        assert_eq!(product.pricing.msrp, Some(129.0));
    }

    #[test]
    fn duplicate_upc_insert_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let repo = SqliteProductRepository::new(&conn);
        let draft = ProductDraft {
            upc: Some("12345".into()),
            ..Default::default()
        };
        repo.insert(&draft).unwrap();
        let err = repo.insert(&draft).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn delete_product_nulls_item_links() {
        let db = Database::open_in_memory().unwrap();
        let auction = db.insert_auction("https://bids.example/auctions/1").unwrap();
        let item = db
            .insert_item(
                auction,
                &ItemDraft {
                    lot: Some("12A".into()),
                    title: Some("Sony Headphones".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let product = {
            let conn = db.connection();
            let products = SqliteProductRepository::new(&conn);
            let id = products.insert(&ProductDraft::default()).unwrap();
            let items = SqliteItemRepository::new(&conn);
            items.set_product(item, id).unwrap();
            id
        };

        db.delete_product(product).unwrap();
        assert_eq!(db.get_item(item).unwrap().product_id, None);
        assert!(matches!(
            db.get_product(product),
            Err(LotbookError::ProductNotFound(_))
        ));
    }

    #[test]
    fn item_view_prefers_product_fields() {
        let db = Database::open_in_memory().unwrap();
        let auction = db.insert_auction("https://bids.example/auctions/2").unwrap();
        let item = db
            .insert_item(
                auction,
                &ItemDraft {
                    lot: Some("3B".into()),
                    title: Some("sony wh1000 xm4 headphones??".into()),
                    brand: Some("sony".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        {
            let conn = db.connection();
            let products = SqliteProductRepository::new(&conn);
            let id = products
                .insert(&ProductDraft {
                    title: Some("Sony WH-1000XM4".into()),
                    brand: Some("Sony".into()),
                    msrp: Some(349.99),
                    ..Default::default()
                })
                .unwrap();
            let items = SqliteItemRepository::new(&conn);
            items.set_product(item, id).unwrap();
        }

        let views = db.list_item_views(auction).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].title.as_deref(), Some("Sony WH-1000XM4"));
        assert_eq!(views[0].master_msrp, Some(349.99));
        // item's own row is untouched
        let raw = db.get_item(item).unwrap();
        assert_eq!(raw.title.as_deref(), Some("sony wh1000 xm4 headphones??"));
    }
}
