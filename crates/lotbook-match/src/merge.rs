//! Merging duplicate products into a surviving master record.

use lotbook_core::{
    Database, ItemRepository, Product, ProductId, ProductRepository, Repository,
    SqliteItemRepository, SqliteProductRepository,
};
use tracing::info;

use crate::error::{MatchError, Result};

/// Collapses `duplicate_ids` into `master_id`: linked items move to the
/// master, fields the master is missing are filled from the duplicates, and
/// the duplicate rows are deleted. All inside one transaction; any failure
/// leaves the catalog untouched.
///
/// The master's own populated fields always win. A duplicate only ever fills
/// a hole.
pub fn merge_products(db: &Database, master_id: ProductId, duplicate_ids: &[ProductId]) -> Result<()> {
    let mut dup_ids: Vec<ProductId> = duplicate_ids
        .iter()
        .copied()
        .filter(|id| *id != master_id)
        .collect();
    dup_ids.sort_unstable();
    dup_ids.dedup();
    if dup_ids.is_empty() {
        return Ok(());
    }

    let conn = db.connection();
    let tx = conn
        .unchecked_transaction()
        .map_err(lotbook_core::LotbookError::from)?;
    {
        let products = SqliteProductRepository::new(&tx);
        let items = SqliteItemRepository::new(&tx);

        let mut master = products
            .find_by_id(&master_id)?
            .ok_or(MatchError::ProductNotFound(master_id))?;

        let mut duplicates = Vec::with_capacity(dup_ids.len());
        for id in &dup_ids {
            let dup = products
                .find_by_id(id)?
                .ok_or(MatchError::ProductNotFound(*id))?;
            duplicates.push(dup);
        }

        for dup in &duplicates {
            absorb(&mut master, dup);
        }

        // relink before deleting so no item is ever orphaned, and delete
        // before saving so a backfilled UPC/ASIN cannot collide with the
        // duplicate row it came from
        items.relink(&dup_ids, master_id)?;
        products.delete_many(&dup_ids)?;
        products.save(&master)?;
    }
    tx.commit().map_err(lotbook_core::LotbookError::from)?;

    info!(master = master_id, merged = dup_ids.len(), "merge complete");
    Ok(())
}

/// Copies each field of `dup` into `master` only where the master's value is
/// missing. Missing means `None`, a blank string, or a zero number. The
/// master's timestamp is not a fillable field and never changes.
fn absorb(master: &mut Product, dup: &Product) {
    fill_string(&mut master.title, &dup.title);
    fill_string(&mut master.brand, &dup.brand);
    fill_string(&mut master.model, &dup.model);
    fill_string(&mut master.upc, &dup.upc);
    fill_string(&mut master.asin, &dup.asin);
    fill_string(&mut master.category, &dup.category);
    fill_string(&mut master.notes, &dup.notes);

    fill_f64(&mut master.pricing.msrp, dup.pricing.msrp);
    fill_f64(&mut master.pricing.avg_sold_price, dup.pricing.avg_sold_price);
    fill_f64(
        &mut master.pricing.target_list_price,
        dup.pricing.target_list_price,
    );
    fill_f64(
        &mut master.pricing.shipping_cost_basis,
        dup.pricing.shipping_cost_basis,
    );

    fill_f64(&mut master.physical.weight_lbs, dup.physical.weight_lbs);
    fill_f64(&mut master.physical.weight_oz, dup.physical.weight_oz);
    fill_f64(&mut master.physical.length, dup.physical.length);
    fill_f64(&mut master.physical.width, dup.physical.width);
    fill_f64(&mut master.physical.height, dup.physical.height);

    fill_f64(&mut master.market.avg_sold_price, dup.market.avg_sold_price);
    fill_f64(&mut master.market.sold_range_low, dup.market.sold_range_low);
    fill_f64(&mut master.market.sold_range_high, dup.market.sold_range_high);
    fill_f64(
        &mut master.market.sell_through_rate,
        dup.market.sell_through_rate,
    );
    fill_i64(&mut master.market.total_sold_count, dup.market.total_sold_count);
    fill_i64(&mut master.market.active_count, dup.market.active_count);
    fill_f64(&mut master.market.avg_list_price, dup.market.avg_list_price);

    master.is_favorite |= dup.is_favorite;
}

fn fill_string(slot: &mut Option<String>, candidate: &Option<String>) {
    let empty = slot.as_deref().is_none_or(|s| s.trim().is_empty());
    if empty && candidate.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        *slot = candidate.clone();
    }
}

fn fill_f64(slot: &mut Option<f64>, candidate: Option<f64>) {
    let empty = slot.is_none_or(|v| v == 0.0);
    if empty && candidate.is_some_and(|v| v != 0.0) {
        *slot = candidate;
    }
}

fn fill_i64(slot: &mut Option<i64>, candidate: Option<i64>) {
    let empty = slot.is_none_or(|v| v == 0);
    if empty && candidate.is_some_and(|v| v != 0) {
        *slot = candidate;
    }
}
