//! Exact and fuzzy matching of an item against the catalog snapshot.

use lotbook_core::{CatalogEntry, ItemKey, ProductId};

use crate::identifiers::{normalize_asin, normalize_upc};

/// Similarity a fuzzy candidate must reach on both brand and model.
pub const FUZZY_THRESHOLD: f64 = 0.85;

/// Brand/model strings shorter than this never fuzzy-match; near-empty
/// strings would match everything.
const MIN_FIELD_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Upc,
    Asin,
}

fn normalize(raw: Option<&str>, kind: IdKind) -> Option<String> {
    match kind {
        IdKind::Upc => normalize_upc(raw),
        IdKind::Asin => normalize_asin(raw),
    }
}

/// Exact-equality lookup on a normalized identifier. An absent input never
/// matches, so two items without a UPC cannot be linked to each other.
pub fn match_by_identifier(
    value: Option<&str>,
    kind: IdKind,
    catalog: &[CatalogEntry],
) -> Option<ProductId> {
    let needle = normalize(value, kind)?;
    catalog
        .iter()
        .find(|entry| {
            let candidate = match kind {
                IdKind::Upc => normalize(entry.upc.as_deref(), kind),
                IdKind::Asin => normalize(entry.asin.as_deref(), kind),
            };
            candidate.as_deref() == Some(needle.as_str())
        })
        .map(|entry| entry.id)
}

/// Normalized character-ratio similarity in 0..=1.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Brand+model match: exact pair first, then a fuzzy pass where both ratios
/// must reach the threshold. Ties resolve to the first catalog entry
/// encountered; there is no secondary tie-break.
pub fn match_by_brand_model(
    brand: Option<&str>,
    model: Option<&str>,
    catalog: &[CatalogEntry],
    threshold: f64,
) -> Option<ProductId> {
    let brand = brand?.trim().to_lowercase();
    let model = model?.trim().to_lowercase();
    if brand.len() < MIN_FIELD_LEN || model.len() < MIN_FIELD_LEN {
        return None;
    }

    let pairs: Vec<(ProductId, String, String)> = catalog
        .iter()
        .filter_map(|entry| {
            let b = entry.brand.as_deref()?.trim().to_lowercase();
            let m = entry.model.as_deref()?.trim().to_lowercase();
            Some((entry.id, b, m))
        })
        .collect();

    // fast path: exact pair
    for (id, b, m) in &pairs {
        if *b == brand && *m == model {
            return Some(*id);
        }
    }

    for (id, b, m) in &pairs {
        if similarity(&brand, b) >= threshold && similarity(&model, m) >= threshold {
            return Some(*id);
        }
    }

    None
}

/// The auto-link cascade: UPC, then ASIN, then fuzzy brand+model. First hit
/// wins; a miss is a normal outcome.
pub fn resolve_item(
    item: &ItemKey,
    catalog: &[CatalogEntry],
    threshold: f64,
) -> Option<ProductId> {
    match_by_identifier(item.upc.as_deref(), IdKind::Upc, catalog)
        .or_else(|| match_by_identifier(item.asin.as_deref(), IdKind::Asin, catalog))
        .or_else(|| {
            match_by_brand_model(item.brand.as_deref(), item.model.as_deref(), catalog, threshold)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: ProductId, upc: Option<&str>, asin: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            id,
            upc: upc.map(String::from),
            asin: asin.map(String::from),
            brand: None,
            model: None,
            title: None,
        }
    }

    fn brand_model_entry(id: ProductId, brand: &str, model: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            upc: None,
            asin: None,
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
            title: None,
        }
    }

    #[test]
    fn upc_match_compares_normalized_values() {
        let catalog = vec![entry(1, Some("00012345"), None), entry(2, Some("99999"), None)];
        assert_eq!(
            match_by_identifier(Some("12345"), IdKind::Upc, &catalog),
            Some(1)
        );
        assert_eq!(
            match_by_identifier(Some("012345"), IdKind::Upc, &catalog),
            Some(1)
        );
    }

    #[test]
    fn leading_zero_stripping_keeps_substantive_digits_apart() {
        let catalog = vec![
            entry(1, Some("012345000999"), None),
            entry(2, Some("012345999"), None),
        ];
        assert_eq!(
            match_by_identifier(Some("12345000999"), IdKind::Upc, &catalog),
            Some(1)
        );
        assert_eq!(
            match_by_identifier(Some("12345999"), IdKind::Upc, &catalog),
            Some(2)
        );
    }

    #[test]
    fn absent_identifier_never_matches() {
        // two records with no UPC must not be linked to each other
        let catalog = vec![entry(1, None, None), entry(2, Some(""), None)];
        assert_eq!(match_by_identifier(None, IdKind::Upc, &catalog), None);
        assert_eq!(match_by_identifier(Some(""), IdKind::Upc, &catalog), None);
        assert_eq!(match_by_identifier(Some("nan"), IdKind::Upc, &catalog), None);
    }

    #[test]
    fn asin_match_is_exact() {
        let catalog = vec![entry(7, None, Some("B08N5WRWNW"))];
        assert_eq!(
            match_by_identifier(Some(" B08N5WRWNW "), IdKind::Asin, &catalog),
            Some(7)
        );
        assert_eq!(
            match_by_identifier(Some("B08N5WRWNX"), IdKind::Asin, &catalog),
            None
        );
    }

    #[test]
    fn exact_brand_model_fast_path() {
        let catalog = vec![
            brand_model_entry(1, "Sony", "WH-1000XM4"),
            brand_model_entry(2, "Bose", "QC45"),
        ];
        assert_eq!(
            match_by_brand_model(Some("sony "), Some(" wh-1000xm4"), &catalog, FUZZY_THRESHOLD),
            Some(1)
        );
    }

    #[test]
    fn short_fields_are_rejected() {
        let catalog = vec![brand_model_entry(1, "a", "b")];
        assert_eq!(
            match_by_brand_model(Some("a"), Some("b"), &catalog, FUZZY_THRESHOLD),
            None
        );
    }

    #[test]
    fn ratio_at_threshold_matches_and_below_does_not() {
        // 20 chars, 3 substitutions: similarity is exactly 1 - 3/20 = 0.85
        let model_a = "abcdefghijklmnopqrst";
        let model_b = "abcdefghijklmnopqXYZ";
        assert!(similarity(model_a, model_b) >= FUZZY_THRESHOLD);

        // 4 substitutions: 0.80, below threshold
        let model_c = "abcdefghijklmnopWXYZ";
        assert!(similarity(model_a, model_c) < FUZZY_THRESHOLD);

        let catalog = vec![brand_model_entry(1, "Sony", model_a)];
        assert_eq!(
            match_by_brand_model(Some("Sony"), Some(model_b), &catalog, FUZZY_THRESHOLD),
            Some(1)
        );
        assert_eq!(
            match_by_brand_model(Some("Sony"), Some(model_c), &catalog, FUZZY_THRESHOLD),
            None
        );
    }

    #[test]
    fn both_fields_must_clear_threshold() {
        let catalog = vec![brand_model_entry(1, "Sony", "abcdefghijklmnopqrst")];
        // model matches exactly, brand similarity is far below threshold
        assert_eq!(
            match_by_brand_model(
                Some("Panasonic"),
                Some("abcdefghijklmnopqrst"),
                &catalog,
                FUZZY_THRESHOLD
            ),
            None
        );
    }

    #[test]
    fn first_catalog_entry_wins_ties() {
        let catalog = vec![
            brand_model_entry(4, "Sonny", "walkman one"),
            brand_model_entry(9, "Sonny", "walkman one"),
        ];
        assert_eq!(
            match_by_brand_model(Some("Sonny"), Some("walkman one"), &catalog, FUZZY_THRESHOLD),
            Some(4)
        );
    }

    #[test]
    fn cascade_prefers_upc_over_fuzzy() {
        let mut by_upc = entry(1, Some("12345"), None);
        by_upc.brand = Some("Generic".to_string());
        by_upc.model = Some("Model Z".to_string());
        let by_name = brand_model_entry(2, "Sony", "WH-1000XM4");
        let catalog = vec![by_name, by_upc];

        let item = ItemKey {
            id: 100,
            title: None,
            brand: Some("Sony".to_string()),
            model: Some("WH-1000XM4".to_string()),
            upc: Some("012345".to_string()),
            asin: None,
        };
        assert_eq!(resolve_item(&item, &catalog, FUZZY_THRESHOLD), Some(1));
    }
}
