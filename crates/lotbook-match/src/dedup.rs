//! Catalog-wide duplicate detection.
//!
//! Three passes over a catalog snapshot: shared UPC, shared ASIN, then fuzzy
//! title similarity. A record claimed by an earlier pass is invisible to
//! later ones, so the reported groups never overlap.

use std::collections::{BTreeMap, HashSet};

use lotbook_core::{CatalogEntry, Database, ProductId, ProductRepository, SqliteProductRepository};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::identifiers::{clean, normalize_upc};
use crate::matcher::{self, FUZZY_THRESHOLD};

/// Titles shorter than this are too generic to cluster on.
const MIN_TITLE_LEN: usize = 4;

/// A set of products believed to be the same real-world product, with a
/// human-readable reason for the grouping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub ids: Vec<ProductId>,
    pub reason: String,
}

/// Scans the whole catalog for likely duplicates. Read-only; the merge step
/// is a separate, explicit operation.
pub fn find_duplicate_groups(db: &Database, threshold: f64) -> Result<Vec<DuplicateGroup>> {
    let entries = {
        let conn = db.connection();
        let products = SqliteProductRepository::new(&conn);
        products.catalog_entries()?
    };
    let groups = scan_entries(&entries, threshold);
    info!(
        candidates = entries.len(),
        groups = groups.len(),
        "duplicate scan complete"
    );
    Ok(groups)
}

/// Scan with the default similarity threshold.
pub fn find_duplicates(db: &Database) -> Result<Vec<DuplicateGroup>> {
    find_duplicate_groups(db, FUZZY_THRESHOLD)
}

fn scan_entries(entries: &[CatalogEntry], threshold: f64) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();
    let mut seen: HashSet<ProductId> = HashSet::new();

    collect_identifier_groups(
        entries,
        &mut groups,
        &mut seen,
        "Same UPC",
        |e| normalize_upc(e.upc.as_deref()),
    );
    collect_identifier_groups(entries, &mut groups, &mut seen, "Same ASIN", |e| {
        clean(e.asin.as_deref()?)
    });
    collect_title_groups(entries, &mut groups, &mut seen, threshold);

    groups
}

/// Buckets records by a normalized identifier; every bucket with more than
/// one member is a group. BTreeMap keeps the output order stable.
fn collect_identifier_groups<F>(
    entries: &[CatalogEntry],
    groups: &mut Vec<DuplicateGroup>,
    seen: &mut HashSet<ProductId>,
    label: &str,
    key: F,
) where
    F: Fn(&CatalogEntry) -> Option<String>,
{
    let mut buckets: BTreeMap<String, Vec<ProductId>> = BTreeMap::new();
    for entry in entries {
        if seen.contains(&entry.id) {
            continue;
        }
        if let Some(value) = key(entry) {
            buckets.entry(value).or_default().push(entry.id);
        }
    }

    for (value, ids) in buckets {
        if ids.len() > 1 {
            seen.extend(&ids);
            groups.push(DuplicateGroup {
                ids,
                reason: format!("{label}: {value}"),
            });
        }
    }
}

/// Greedy star aggregation over titles: each unclaimed record seeds a group
/// and pulls in every later unclaimed record whose title clears the
/// threshold against the seed.
fn collect_title_groups(
    entries: &[CatalogEntry],
    groups: &mut Vec<DuplicateGroup>,
    seen: &mut HashSet<ProductId>,
    threshold: f64,
) {
    // TODO: blocking on a title prefix would cut this below O(n^2) once the
    // catalog outgrows a few thousand rows.
    let titled: Vec<(ProductId, String)> = entries
        .iter()
        .filter(|e| !seen.contains(&e.id))
        .filter_map(|e| {
            let t = e.title.as_deref()?.trim().to_lowercase();
            if t.len() < MIN_TITLE_LEN {
                return None;
            }
            Some((e.id, t))
        })
        .collect();

    for (i, (seed_id, seed_title)) in titled.iter().enumerate() {
        if seen.contains(seed_id) {
            continue;
        }
        let mut ids = vec![*seed_id];
        for (other_id, other_title) in &titled[i + 1..] {
            if seen.contains(other_id) {
                continue;
            }
            if matcher::similarity(seed_title, other_title) >= threshold {
                ids.push(*other_id);
            }
        }
        if ids.len() > 1 {
            seen.extend(&ids);
            groups.push(DuplicateGroup {
                ids,
                reason: "Similar Titles".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        id: ProductId,
        title: Option<&str>,
        upc: Option<&str>,
        asin: Option<&str>,
    ) -> CatalogEntry {
        CatalogEntry {
            id,
            upc: upc.map(String::from),
            asin: asin.map(String::from),
            brand: None,
            model: None,
            title: title.map(String::from),
        }
    }

    #[test]
    fn upc_groups_compare_normalized_values() {
        let entries = vec![
            entry(1, Some("Widget"), Some("012345"), None),
            entry(2, Some("Widget deluxe"), Some("12345"), None),
            entry(3, Some("Unrelated"), Some("99999"), None),
        ];
        let groups = scan_entries(&entries, FUZZY_THRESHOLD);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ids, vec![1, 2]);
        assert_eq!(groups[0].reason, "Same UPC: 12345");
    }

    #[test]
    fn asin_pass_skips_records_claimed_by_upc() {
        // 1 and 2 share a UPC; 2 and 3 share an ASIN. The UPC pass claims
        // 1 and 2, so the ASIN bucket holding only 3 is not a group.
        let entries = vec![
            entry(1, None, Some("777"), Some("B000000001")),
            entry(2, None, Some("777"), Some("B000000002")),
            entry(3, None, None, Some("B000000002")),
        ];
        let groups = scan_entries(&entries, FUZZY_THRESHOLD);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].reason, "Same UPC: 777");
        assert_eq!(groups[0].ids, vec![1, 2]);
    }

    #[test]
    fn asin_groups_use_the_raw_cleaned_value() {
        let entries = vec![
            entry(1, None, None, Some(" B08N5WRWNW ")),
            entry(2, None, None, Some("B08N5WRWNW")),
        ];
        let groups = scan_entries(&entries, FUZZY_THRESHOLD);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].reason, "Same ASIN: B08N5WRWNW");
    }

    #[test]
    fn similar_titles_form_a_group() {
        let entries = vec![
            entry(1, Some("Sony WH-1000XM4 Headphones"), None, None),
            entry(2, Some("Sony WH-1000XM4 headphone"), None, None),
            entry(3, Some("Cast iron skillet"), None, None),
        ];
        let groups = scan_entries(&entries, FUZZY_THRESHOLD);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ids, vec![1, 2]);
        assert_eq!(groups[0].reason, "Similar Titles");
    }

    #[test]
    fn short_titles_never_cluster() {
        let entries = vec![
            entry(1, Some("box"), None, None),
            entry(2, Some("box"), None, None),
        ];
        assert!(scan_entries(&entries, FUZZY_THRESHOLD).is_empty());
    }

    #[test]
    fn placeholder_identifiers_do_not_group() {
        let entries = vec![
            entry(1, Some("first thing"), Some("nan"), Some("none")),
            entry(2, Some("second thing"), Some("nan"), Some("none")),
            entry(3, Some("third thing"), Some("0000"), None),
            entry(4, Some("fourth thing"), Some("000"), None),
        ];
        assert!(scan_entries(&entries, FUZZY_THRESHOLD).is_empty());
    }

    #[test]
    fn groups_never_share_a_record() {
        let entries = vec![
            entry(1, Some("Sony WH-1000XM4 Headphones"), Some("555"), None),
            entry(2, Some("Sony WH-1000XM4 Headphones"), Some("555"), None),
            entry(3, Some("Sony WH-1000XM4 Headphone"), None, None),
            entry(4, Some("Sony WH-1000XM4 Headphonez"), None, None),
        ];
        let groups = scan_entries(&entries, FUZZY_THRESHOLD);
        let mut all_ids: Vec<ProductId> = groups.iter().flat_map(|g| g.ids.clone()).collect();
        let before = all_ids.len();
        all_ids.sort_unstable();
        all_ids.dedup();
        assert_eq!(before, all_ids.len());

        // the UPC pair was claimed first; the title pass only groups 3 and 4
        assert_eq!(groups[0].reason, "Same UPC: 555");
        assert_eq!(groups[1].reason, "Similar Titles");
        assert_eq!(groups[1].ids, vec![3, 4]);
    }

    #[test]
    fn end_to_end_scan_reads_the_catalog() {
        use lotbook_core::ProductDraft;

        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.connection();
            let products = SqliteProductRepository::new(&conn);
            products
                .insert(&ProductDraft {
                    title: Some("Dewalt drill 20v".into()),
                    upc: Some("0885911".into()),
                    ..Default::default()
                })
                .unwrap();
            products
                .insert(&ProductDraft {
                    title: Some("DeWALT Drill kit".into()),
                    upc: Some("885911000".into()),
                    ..Default::default()
                })
                .unwrap();
        }
        // different once zero-stripped, so only the title pass could group
        // them, and these titles are not similar enough
        let groups = find_duplicates(&db).unwrap();
        assert!(groups.is_empty());
    }
}
