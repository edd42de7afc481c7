mod item_view;
mod stats;

pub use item_view::ItemViewQuery;
pub use stats::{CatalogStats, CatalogStatsQuery};
