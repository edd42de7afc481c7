//! lotbook-match — identifier normalization, item-to-product matching,
//! duplicate detection, and merging for the auction-lot catalog.
//!
//! Everything here operates on a [`lotbook_core::Database`] and commits in
//! single transactions, so each operation either fully applies or leaves the
//! catalog as it found it.

pub mod dedup;
pub mod error;
pub mod identifiers;
pub mod linker;
pub mod matcher;
pub mod merge;
pub mod upsert;

pub use dedup::{DuplicateGroup, find_duplicate_groups, find_duplicates};
pub use error::{MatchError, Result};
pub use linker::{auto_link, auto_link_with_threshold};
pub use matcher::FUZZY_THRESHOLD;
pub use merge::merge_products;
pub use upsert::resolve_and_save;
