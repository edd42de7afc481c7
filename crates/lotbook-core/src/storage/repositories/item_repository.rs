use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::{AuctionId, AuctionItem, ItemDraft, ItemId, ItemKey, ProductId};

use super::Repository;

const ITEM_COLUMNS: &str = "id, auction_id, product_id, lot, current_bid, sold_price, status,
        title, brand, model, packaging, condition, functional,
        missing_parts, missing_parts_desc, damaged, damage_desc, item_notes,
        upc, asin, url, suggested_msrp, scraped_category,
        is_watched, is_hidden, is_won";

pub trait ItemRepository: Repository<Entity = AuctionItem, Id = ItemId> {
    fn insert(&self, auction_id: AuctionId, draft: &ItemDraft) -> Result<ItemId>;
    /// Items with no product reference, the auto-link scan set.
    fn unlinked(&self, scope: Option<AuctionId>) -> Result<Vec<ItemKey>>;
    fn set_product(&self, item_id: ItemId, product_id: ProductId) -> Result<()>;
    fn link_many(&self, item_ids: &[ItemId], product_id: ProductId) -> Result<usize>;
    /// Redirect every item referencing one of `old_ids` to `new_id`.
    fn relink(&self, old_ids: &[ProductId], new_id: ProductId) -> Result<usize>;
    /// Null out all references to a product (pre-delete).
    fn clear_product_links(&self, product_id: ProductId) -> Result<usize>;
    fn record_final_price(
        &self,
        auction_id: AuctionId,
        lot: &str,
        sold_price: f64,
        status: &str,
    ) -> Result<usize>;
    fn count_linked_to(&self, product_id: ProductId) -> Result<usize>;
}

pub struct SqliteItemRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteItemRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<AuctionItem> {
        Ok(AuctionItem {
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
            packaging: row.get(10)?,
            condition: row.get(11)?,
            functional: row.get(12)?,
            missing_parts: row.get(13)?,
            missing_parts_desc: row.get(14)?,
            damaged: row.get(15)?,
            damage_desc: row.get(16)?,
            item_notes: row.get(17)?,
            upc: row.get(18)?,
            asin: row.get(19)?,
            url: row.get(20)?,
            suggested_msrp: row.get(21)?,
            scraped_category: row.get(22)?,
            is_watched: row.get(23)?,
            is_hidden: row.get(24)?,
            is_won: row.get(25)?,
        })
    }
}

impl<'a> Repository for SqliteItemRepository<'a> {
    type Entity = AuctionItem;
    type Id = ItemId;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM auction_items WHERE id = ?1"))?;
        match stmt.query_row(params![id], Self::row_to_item) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, item: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "UPDATE auction_items SET
                product_id = ?1, lot = ?2, current_bid = ?3, sold_price = ?4, status = ?5,
                title = ?6, brand = ?7, model = ?8, packaging = ?9, condition = ?10,
                functional = ?11, missing_parts = ?12, missing_parts_desc = ?13,
                damaged = ?14, damage_desc = ?15, item_notes = ?16,
                upc = ?17, asin = ?18, url = ?19, suggested_msrp = ?20,
                scraped_category = ?21, is_watched = ?22, is_hidden = ?23, is_won = ?24
             WHERE id = ?25",
            params![
                item.product_id,
                item.lot,
                item.current_bid,
                item.sold_price,
                item.status,
                item.title,
                item.brand,
                item.model,
                item.packaging,
                item.condition,
                item.functional,
                item.missing_parts,
                item.missing_parts_desc,
                item.damaged,
                item.damage_desc,
                item.item_notes,
                item.upc,
                item.asin,
                item.url,
                item.suggested_msrp,
                item.scraped_category,
                item.is_watched,
                item.is_hidden,
                item.is_won,
                item.id,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM auction_items WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> ItemRepository for SqliteItemRepository<'a> {
    fn insert(&self, auction_id: AuctionId, draft: &ItemDraft) -> Result<ItemId> {
        self.conn.execute(
            "INSERT INTO auction_items
                (auction_id, lot, current_bid, title, brand, model,
                 packaging, condition, functional, missing_parts, missing_parts_desc,
                 damaged, damage_desc, item_notes, upc, asin, url,
                 suggested_msrp, scraped_category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                auction_id,
                draft.lot,
                draft.current_bid,
                draft.title,
                draft.brand,
                draft.model,
                draft.packaging,
                draft.condition,
                draft.functional,
                draft.missing_parts,
                draft.missing_parts_desc,
                draft.damaged,
                draft.damage_desc,
                draft.item_notes,
                draft.upc,
                draft.asin,
                draft.url,
                draft.suggested_msrp,
                draft.scraped_category,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn unlinked(&self, scope: Option<AuctionId>) -> Result<Vec<ItemKey>> {
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<ItemKey> {
            Ok(ItemKey {
                id: row.get(0)?,
                title: row.get(1)?,
                brand: row.get(2)?,
                model: row.get(3)?,
                upc: row.get(4)?,
                asin: row.get(5)?,
            })
        };

        let rows = match scope {
            Some(auction_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, title, brand, model, upc, asin FROM auction_items
                     WHERE product_id IS NULL AND auction_id = ?1 ORDER BY id",
                )?;
                stmt.query_map(params![auction_id], map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, title, brand, model, upc, asin FROM auction_items
                     WHERE product_id IS NULL ORDER BY id",
                )?;
                stmt.query_map([], map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(rows)
    }

    fn set_product(&self, item_id: ItemId, product_id: ProductId) -> Result<()> {
        self.conn.execute(
            "UPDATE auction_items SET product_id = ?1 WHERE id = ?2",
            params![product_id, item_id],
        )?;
        Ok(())
    }

    fn link_many(&self, item_ids: &[ItemId], product_id: ProductId) -> Result<usize> {
        if item_ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; item_ids.len()].join(",");
        let sql =
            format!("UPDATE auction_items SET product_id = ?1 WHERE id IN ({placeholders})");
        let mut values: Vec<&dyn rusqlite::ToSql> = vec![&product_id];
        for id in item_ids {
            values.push(id);
        }
        let updated = self.conn.execute(&sql, values.as_slice())?;
        Ok(updated)
    }

    fn relink(&self, old_ids: &[ProductId], new_id: ProductId) -> Result<usize> {
        if old_ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; old_ids.len()].join(",");
        let sql = format!(
            "UPDATE auction_items SET product_id = ?1 WHERE product_id IN ({placeholders})"
        );
        let mut values: Vec<&dyn rusqlite::ToSql> = vec![&new_id];
        for id in old_ids {
            values.push(id);
        }
        let updated = self.conn.execute(&sql, values.as_slice())?;
        Ok(updated)
    }

    fn clear_product_links(&self, product_id: ProductId) -> Result<usize> {
        let updated = self.conn.execute(
            "UPDATE auction_items SET product_id = NULL WHERE product_id = ?1",
            params![product_id],
        )?;
        Ok(updated)
    }

    fn record_final_price(
        &self,
        auction_id: AuctionId,
        lot: &str,
        sold_price: f64,
        status: &str,
    ) -> Result<usize> {
        let updated = self.conn.execute(
            "UPDATE auction_items SET sold_price = ?1, status = ?2
             WHERE auction_id = ?3 AND lot = ?4",
            params![sold_price, status, auction_id, lot],
        )?;
        Ok(updated)
    }

    fn count_linked_to(&self, product_id: ProductId) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM auction_items WHERE product_id = ?1",
            params![product_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
