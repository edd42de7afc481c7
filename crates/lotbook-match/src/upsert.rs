//! Conflict-safe create/update of canonical products.

use lotbook_core::{
    Database, ItemId, ItemRepository, ProductDraft, ProductId, ProductRepository,
    SqliteItemRepository, SqliteProductRepository,
};
use tracing::{debug, warn};

use crate::error::{MatchError, Result};
use crate::identifiers::{normalize_asin, normalize_upc};

/// Resolves whether the save targets an existing record (explicit id, else
/// identifier lookup) or creates a new one, redirects the write when the
/// UPC/ASIN is already owned elsewhere, and optionally links a batch of
/// auction items to the saved product. One transaction end to end.
///
/// A uniqueness violation that survives the redirect is a true race and
/// surfaces as [`MatchError::DuplicateIdentifier`]; the transaction rolls
/// back and nothing is written.
pub fn resolve_and_save(
    db: &Database,
    draft: &ProductDraft,
    link_targets: &[ItemId],
) -> Result<ProductId> {
    let mut fields = draft.clone();
    fields.upc = normalize_upc(draft.upc.as_deref());
    fields.asin = normalize_asin(draft.asin.as_deref());

    let conn = db.connection();
    let tx = conn
        .unchecked_transaction()
        .map_err(lotbook_core::LotbookError::from)?;

    let saved_id = {
        let products = SqliteProductRepository::new(&tx);

        let resolved = resolve_target(&products, &fields)?;

        let write_result = match resolved {
            Some(target) => {
                let final_id = redirect_on_conflict(&products, target, &fields)?;
                if final_id != target {
                    debug!(target, final_id, "save redirected to identifier owner");
                }
                products.update(final_id, &fields).map(|_| final_id)
            }
            None => products.insert(&fields),
        };

        let saved_id = write_result.map_err(|e| {
            if e.is_unique_violation() {
                let identifier = fields
                    .upc
                    .clone()
                    .or_else(|| fields.asin.clone())
                    .unwrap_or_default();
                warn!(%identifier, "save abandoned: identifier owned by another record");
                MatchError::DuplicateIdentifier(identifier)
            } else {
                MatchError::Store(e)
            }
        })?;

        if !link_targets.is_empty() {
            let items = SqliteItemRepository::new(&tx);
            items.link_many(link_targets, saved_id)?;
        }

        saved_id
    };

    tx.commit().map_err(lotbook_core::LotbookError::from)?;
    Ok(saved_id)
}

/// Explicit id wins; otherwise normalized UPC, then ASIN, decides whether an
/// existing record is being edited. No hit means a new record.
fn resolve_target(
    products: &SqliteProductRepository<'_>,
    fields: &ProductDraft,
) -> Result<Option<ProductId>> {
    if let Some(id) = fields.id {
        return Ok(Some(id));
    }
    if let Some(upc) = fields.upc.as_deref()
        && let Some(id) = products.find_id_by_upc(upc)?
    {
        return Ok(Some(id));
    }
    if let Some(asin) = fields.asin.as_deref()
        && let Some(id) = products.find_id_by_asin(asin)?
    {
        return Ok(Some(id));
    }
    Ok(None)
}

/// If the UPC or ASIN being written already belongs to a different record,
/// the write converges onto that owner instead of violating uniqueness.
fn redirect_on_conflict(
    products: &SqliteProductRepository<'_>,
    target: ProductId,
    fields: &ProductDraft,
) -> Result<ProductId> {
    let mut final_id = target;

    if let Some(upc) = fields.upc.as_deref()
        && let Some(owner) = products.upc_owner_excluding(upc, target)?
    {
        final_id = owner;
    }
    if let Some(asin) = fields.asin.as_deref()
        && let Some(owner) = products.asin_owner_excluding(asin, target)?
    {
        final_id = owner;
    }

    Ok(final_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotbook_core::ItemDraft;

    fn draft(title: &str) -> ProductDraft {
        ProductDraft {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn new_record_is_inserted() {
        let db = Database::open_in_memory().unwrap();
        let id = resolve_and_save(&db, &draft("Widget Pro"), &[]).unwrap();
        assert_eq!(db.get_product(id).unwrap().title.as_deref(), Some("Widget Pro"));
    }

    #[test]
    fn save_resolves_existing_record_by_upc() {
        let db = Database::open_in_memory().unwrap();
        let mut first = draft("Widget");
        first.upc = Some("012345".into());
        let id = resolve_and_save(&db, &first, &[]).unwrap();

        // same UPC spelled with extra leading zeros resolves to the same row
        let mut second = draft("Widget Pro");
        second.upc = Some("0012345".into());
        second.msrp = Some(19.99);
        let resolved = resolve_and_save(&db, &second, &[]).unwrap();

        assert_eq!(resolved, id);
        assert_eq!(db.count_products().unwrap(), 1);
        let product = db.get_product(id).unwrap();
        assert_eq!(product.title.as_deref(), Some("Widget Pro"));
        assert_eq!(product.pricing.msrp, Some(19.99));
    }

    #[test]
    fn conflicting_upc_redirects_to_owner() {
        let db = Database::open_in_memory().unwrap();
        let mut owner = draft("Owner");
        owner.upc = Some("012345".into());
        let owner_id = resolve_and_save(&db, &owner, &[]).unwrap();

        let other_id = resolve_and_save(&db, &draft("Other"), &[]).unwrap();
        assert_ne!(owner_id, other_id);

        // explicit edit of `other`, but writing the owner's UPC
        let mut edit = draft("Edited");
        edit.id = Some(other_id);
        edit.upc = Some("012345".into());
        let saved = resolve_and_save(&db, &edit, &[]).unwrap();

        assert_eq!(saved, owner_id);
        assert_eq!(db.get_product(owner_id).unwrap().title.as_deref(), Some("Edited"));
        // the originally targeted record was left alone
        assert_eq!(db.get_product(other_id).unwrap().title.as_deref(), Some("Other"));
    }

    #[test]
    fn double_conflict_fails_and_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let mut upc_owner = draft("UPC Owner");
        upc_owner.upc = Some("111".into());
        let upc_owner_id = resolve_and_save(&db, &upc_owner, &[]).unwrap();

        let mut asin_owner = draft("ASIN Owner");
        asin_owner.asin = Some("B000ASIN01".into());
        resolve_and_save(&db, &asin_owner, &[]).unwrap();

        // UPC belongs to one record, ASIN to another: the redirect lands on
        // the ASIN owner and the UPC write still collides.
        let mut edit = draft("Clash");
        edit.id = Some(upc_owner_id);
        edit.upc = Some("111".into());
        edit.asin = Some("B000ASIN01".into());
        let err = resolve_and_save(&db, &edit, &[]).unwrap_err();
        assert!(matches!(err, MatchError::DuplicateIdentifier(_)));

        // nothing was half-written
        assert_eq!(
            db.get_product(upc_owner_id).unwrap().title.as_deref(),
            Some("UPC Owner")
        );
    }

    #[test]
    fn uniqueness_holds_after_saves() {
        let db = Database::open_in_memory().unwrap();
        let mut a = draft("A");
        a.upc = Some("555".into());
        resolve_and_save(&db, &a, &[]).unwrap();

        let mut b = draft("B");
        b.upc = Some("0555".into());
        resolve_and_save(&db, &b, &[]).unwrap();

        let entries = {
            let conn = db.connection();
            let products = SqliteProductRepository::new(&conn);
            products.catalog_entries().unwrap()
        };
        let upcs: Vec<_> = entries.iter().filter_map(|e| e.upc.clone()).collect();
        let mut deduped = upcs.clone();
        deduped.dedup();
        assert_eq!(upcs, deduped);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn placeholder_identifiers_are_stored_as_null() {
        let db = Database::open_in_memory().unwrap();
        let mut a = draft("A");
        a.upc = Some("nan".into());
        a.asin = Some("  ".into());
        let id = resolve_and_save(&db, &a, &[]).unwrap();
        let product = db.get_product(id).unwrap();
        assert_eq!(product.upc, None);
        assert_eq!(product.asin, None);

        // a second placeholder save must not unify with the first
        let mut b = draft("B");
        b.upc = Some("none".into());
        let other = resolve_and_save(&db, &b, &[]).unwrap();
        assert_ne!(other, id);
    }

    #[test]
    fn link_targets_are_linked_in_the_same_save() {
        let db = Database::open_in_memory().unwrap();
        let auction = db.insert_auction("https://bids.example/auctions/3").unwrap();
        let first = db.insert_item(auction, &ItemDraft::default()).unwrap();
        let second = db.insert_item(auction, &ItemDraft::default()).unwrap();

        let id = resolve_and_save(&db, &draft("Widget"), &[first, second]).unwrap();
        assert_eq!(db.get_item(first).unwrap().product_id, Some(id));
        assert_eq!(db.get_item(second).unwrap().product_id, Some(id));
    }
}
