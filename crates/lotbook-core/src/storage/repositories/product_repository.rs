use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::{CatalogEntry, Product, ProductDraft, ProductId, ProductSummaryView};

use super::Repository;

const PRODUCT_COLUMNS: &str = "id, title, brand, model, upc, asin, category,
        msrp, avg_sold_price, target_list_price, shipping_cost_basis,
        weight_lbs, weight_oz, length, width, height,
        market_avg_sold, market_sold_low, market_sold_high, market_sell_through,
        market_total_sold, market_active_count, market_avg_list,
        notes, is_favorite, created_at";

pub trait ProductRepository: Repository<Entity = Product, Id = ProductId> {
    fn insert(&self, draft: &ProductDraft) -> Result<ProductId>;
    fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<()>;
    fn find_id_by_upc(&self, upc: &str) -> Result<Option<ProductId>>;
    fn find_id_by_asin(&self, asin: &str) -> Result<Option<ProductId>>;
    /// Owner of the identifier among records other than `excluding`.
    fn upc_owner_excluding(&self, upc: &str, excluding: ProductId) -> Result<Option<ProductId>>;
    fn asin_owner_excluding(&self, asin: &str, excluding: ProductId) -> Result<Option<ProductId>>;
    fn catalog_entries(&self) -> Result<Vec<CatalogEntry>>;
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ProductSummaryView>>;
    fn count(&self) -> Result<usize>;
    fn delete_many(&self, ids: &[ProductId]) -> Result<usize>;
    /// Products linked to no item and created before the cutoff.
    fn list_orphans(&self, cutoff: DateTime<Utc>) -> Result<Vec<ProductSummaryView>>;
}

pub struct SqliteProductRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteProductRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        let created_raw: String = row.get(25)?;
        let created_at = DateTime::parse_from_rfc3339(&created_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let mut product = Product::new();
        product.id = row.get(0)?;
        product.title = row.get(1)?;
        product.brand = row.get(2)?;
        product.model = row.get(3)?;
        product.upc = row.get(4)?;
        product.asin = row.get(5)?;
        product.category = row.get(6)?;
        product.pricing.msrp = row.get(7)?;
        product.pricing.avg_sold_price = row.get(8)?;
        product.pricing.target_list_price = row.get(9)?;
        product.pricing.shipping_cost_basis = row.get(10)?;
        product.physical.weight_lbs = row.get(11)?;
        product.physical.weight_oz = row.get(12)?;
        product.physical.length = row.get(13)?;
        product.physical.width = row.get(14)?;
        product.physical.height = row.get(15)?;
        product.market.avg_sold_price = row.get(16)?;
        product.market.sold_range_low = row.get(17)?;
        product.market.sold_range_high = row.get(18)?;
        product.market.sell_through_rate = row.get(19)?;
        product.market.total_sold_count = row.get(20)?;
        product.market.active_count = row.get(21)?;
        product.market.avg_list_price = row.get(22)?;
        product.notes = row.get(23)?;
        product.is_favorite = row.get(24)?;
        product.created_at = created_at;
        Ok(product)
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<ProductSummaryView> {
        let created_raw: String = row.get(8)?;
        Ok(ProductSummaryView {
            id: row.get(0)?,
            title: row.get(1)?,
            brand: row.get(2)?,
            model: row.get(3)?,
            upc: row.get(4)?,
            asin: row.get(5)?,
            linked_items: row.get(6)?,
            is_favorite: row.get(7)?,
            created_at: DateTime::parse_from_rfc3339(&created_raw)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

impl<'a> Repository for SqliteProductRepository<'a> {
    type Entity = Product;
    type Id = ProductId;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"))?;
        let product = stmt.query_row(params![id], Self::row_to_product);
        match product {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, product: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "UPDATE products SET
                title = ?1, brand = ?2, model = ?3, upc = ?4, asin = ?5, category = ?6,
                msrp = ?7, avg_sold_price = ?8, target_list_price = ?9, shipping_cost_basis = ?10,
                weight_lbs = ?11, weight_oz = ?12, length = ?13, width = ?14, height = ?15,
                market_avg_sold = ?16, market_sold_low = ?17, market_sold_high = ?18,
                market_sell_through = ?19, market_total_sold = ?20, market_active_count = ?21,
                market_avg_list = ?22, notes = ?23, is_favorite = ?24, created_at = ?25
             WHERE id = ?26",
            params![
                product.title,
                product.brand,
                product.model,
                product.upc,
                product.asin,
                product.category,
                product.pricing.msrp,
                product.pricing.avg_sold_price,
                product.pricing.target_list_price,
                product.pricing.shipping_cost_basis,
                product.physical.weight_lbs,
                product.physical.weight_oz,
                product.physical.length,
                product.physical.width,
                product.physical.height,
                product.market.avg_sold_price,
                product.market.sold_range_low,
                product.market.sold_range_high,
                product.market.sell_through_rate,
                product.market.total_sold_count,
                product.market.active_count,
                product.market.avg_list_price,
                product.notes,
                product.is_favorite,
                product.created_at.to_rfc3339(),
                product.id,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> ProductRepository for SqliteProductRepository<'a> {
    fn insert(&self, draft: &ProductDraft) -> Result<ProductId> {
        self.conn.execute(
            "INSERT INTO products
                (title, brand, model, upc, asin, category,
                 msrp, avg_sold_price, target_list_price, shipping_cost_basis,
                 weight_lbs, weight_oz, length, width, height, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                draft.title,
                draft.brand,
                draft.model,
                draft.upc,
                draft.asin,
                draft.category,
                draft.msrp,
                draft.avg_sold_price,
                draft.target_list_price,
                draft.shipping_cost_basis,
                draft.weight_lbs,
                draft.weight_oz,
                draft.length,
                draft.width,
                draft.height,
                draft.notes,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<()> {
        self.conn.execute(
            "UPDATE products SET
                title = ?1, brand = ?2, model = ?3, upc = ?4, asin = ?5, category = ?6,
                msrp = ?7, avg_sold_price = ?8, target_list_price = ?9, shipping_cost_basis = ?10,
                weight_lbs = ?11, weight_oz = ?12, length = ?13, width = ?14, height = ?15,
                notes = ?16
             WHERE id = ?17",
            params![
                draft.title,
                draft.brand,
                draft.model,
                draft.upc,
                draft.asin,
                draft.category,
                draft.msrp,
                draft.avg_sold_price,
                draft.target_list_price,
                draft.shipping_cost_basis,
                draft.weight_lbs,
                draft.weight_oz,
                draft.length,
                draft.width,
                draft.height,
                draft.notes,
                id,
            ],
        )?;
        Ok(())
    }

    fn find_id_by_upc(&self, upc: &str) -> Result<Option<ProductId>> {
        let id = self
            .conn
            .query_row("SELECT id FROM products WHERE upc = ?1", params![upc], |row| {
                row.get(0)
            });
        match id {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_id_by_asin(&self, asin: &str) -> Result<Option<ProductId>> {
        let id = self
            .conn
            .query_row("SELECT id FROM products WHERE asin = ?1", params![asin], |row| {
                row.get(0)
            });
        match id {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn upc_owner_excluding(&self, upc: &str, excluding: ProductId) -> Result<Option<ProductId>> {
        let id = self.conn.query_row(
            "SELECT id FROM products WHERE upc = ?1 AND id != ?2",
            params![upc, excluding],
            |row| row.get(0),
        );
        match id {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn asin_owner_excluding(&self, asin: &str, excluding: ProductId) -> Result<Option<ProductId>> {
        let id = self.conn.query_row(
            "SELECT id FROM products WHERE asin = ?1 AND id != ?2",
            params![asin, excluding],
            |row| row.get(0),
        );
        match id {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn catalog_entries(&self) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, upc, asin, brand, model, title FROM products ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CatalogEntry {
                    id: row.get(0)?,
                    upc: row.get(1)?,
                    asin: row.get(2)?,
                    brand: row.get(3)?,
                    model: row.get(4)?,
                    title: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ProductSummaryView>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.title, p.brand, p.model, p.upc, p.asin,
                    COUNT(i.id), p.is_favorite, p.created_at
             FROM products p
             LEFT JOIN auction_items i ON i.product_id = p.id
             GROUP BY p.id
             ORDER BY p.created_at DESC
             LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn delete_many(&self, ids: &[ProductId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("DELETE FROM products WHERE id IN ({placeholders})");
        let deleted = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(ids.iter()))?;
        Ok(deleted)
    }

    fn list_orphans(&self, cutoff: DateTime<Utc>) -> Result<Vec<ProductSummaryView>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.title, p.brand, p.model, p.upc, p.asin,
                    0, p.is_favorite, p.created_at
             FROM products p
             LEFT JOIN auction_items i ON i.product_id = p.id
             WHERE i.id IS NULL AND p.created_at < ?1
             ORDER BY p.created_at",
        )?;
        let rows = stmt
            .query_map(params![cutoff.to_rfc3339()], Self::row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
