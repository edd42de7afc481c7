//! lotbook-core — models, SQLite storage, and configuration for the
//! auction-lot product catalog.

pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, MatchingConfig, StorageConfig};
pub use error::{ExitCode, LotbookError, Result};
pub use models::*;

pub use storage::database::{
    ConnectionPool, Database, Migration, SCHEMA_VERSION, get_applied_versions, open_database,
    open_in_memory, run_migrations,
};
pub use storage::queries::{CatalogStats, CatalogStatsQuery, ItemViewQuery};
pub use storage::repositories::{
    AuctionRepository, ItemRepository, ProductRepository, Repository, SqliteAuctionRepository,
    SqliteItemRepository, SqliteProductRepository,
};
