//! Batch linking of unlinked auction items to catalog products.

use lotbook_core::{
    AuctionId, Database, ItemRepository, ProductRepository, SqliteItemRepository,
    SqliteProductRepository,
};
use tracing::{debug, info};

use crate::Result;
use crate::matcher;

/// Links every unlinked item it can resolve, cascading UPC → ASIN → fuzzy
/// brand+model. Returns the number of items newly linked.
///
/// Re-running is a no-op: the scan set is `product_id IS NULL`, so items
/// linked on a previous run are excluded by construction.
pub fn auto_link(db: &Database, scope: Option<AuctionId>) -> Result<usize> {
    auto_link_with_threshold(db, scope, matcher::FUZZY_THRESHOLD)
}

pub fn auto_link_with_threshold(
    db: &Database,
    scope: Option<AuctionId>,
    threshold: f64,
) -> Result<usize> {
    let conn = db.connection();
    let tx = conn.unchecked_transaction().map_err(lotbook_core::LotbookError::from)?;

    let mut linked = 0usize;
    {
        let items = SqliteItemRepository::new(&tx);
        let products = SqliteProductRepository::new(&tx);

        let unlinked = items.unlinked(scope)?;
        let catalog = products.catalog_entries()?;

        for item in &unlinked {
            if let Some(product_id) = matcher::resolve_item(item, &catalog, threshold) {
                items.set_product(item.id, product_id)?;
                debug!(item = item.id, product = product_id, "linked item");
                linked += 1;
            }
        }
    }
    tx.commit().map_err(lotbook_core::LotbookError::from)?;

    info!(linked, ?scope, "auto-link pass complete");
    Ok(linked)
}
