//! Normalization of raw UPC/ASIN strings for comparison.
//!
//! Scraped identifier fields arrive as free text: padded with whitespace,
//! holding placeholder junk like "nan", or zero-padded UPCs of varying
//! length. Everything here is a pure function.

/// Trims and rejects placeholder values. Empty string, "nan" and "none"
/// (case-insensitive) all mean "no identifier".
pub fn clean(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(s.to_string())
}

/// Canonical UPC: cleaned, then leading zeros stripped so numerically
/// equivalent codes of different length compare equal. An all-zero code
/// normalizes to absent.
pub fn normalize_upc(raw: Option<&str>) -> Option<String> {
    let cleaned = clean(raw?)?;
    let stripped = cleaned.trim_start_matches('0');
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_string())
}

/// Canonical ASIN: cleaned only. ASINs are fixed-length, no zero padding.
pub fn normalize_asin(raw: Option<&str>) -> Option<String> {
    clean(raw?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_rejects_placeholders() {
        assert_eq!(clean(""), None);
        assert_eq!(clean("   "), None);
        assert_eq!(clean("nan"), None);
        assert_eq!(clean("NaN"), None);
        assert_eq!(clean("None"), None);
        assert_eq!(clean(" B08N5WRWNW "), Some("B08N5WRWNW".to_string()));
    }

    #[test]
    fn upc_strips_leading_zeros_only() {
        assert_eq!(normalize_upc(Some("012345")), Some("12345".to_string()));
        assert_eq!(normalize_upc(Some("00885911")), Some("885911".to_string()));
        // interior and trailing zeros are substantive digits
        assert_eq!(
            normalize_upc(Some("012345000999")),
            Some("12345000999".to_string())
        );
        assert_eq!(
            normalize_upc(Some("012345999")),
            Some("12345999".to_string())
        );
        assert_ne!(
            normalize_upc(Some("012345000999")),
            normalize_upc(Some("012345999"))
        );
    }

    #[test]
    fn all_zero_upc_is_absent() {
        assert_eq!(normalize_upc(Some("0000")), None);
        assert_eq!(normalize_upc(Some("0")), None);
    }

    #[test]
    fn absent_inputs_stay_absent() {
        assert_eq!(normalize_upc(None), None);
        assert_eq!(normalize_upc(Some("nan")), None);
        assert_eq!(normalize_asin(None), None);
        assert_eq!(normalize_asin(Some("  ")), None);
    }
}
