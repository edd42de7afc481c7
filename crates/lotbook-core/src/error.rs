use thiserror::Error;

/// All errors that can occur in lotbook-core.
#[derive(Debug, Error)]
pub enum LotbookError {
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Auction item not found: {0}")]
    ItemNotFound(i64),

    #[error("Auction not found: {0}")]
    AuctionNotFound(i64),

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LotbookError {
    /// True when the underlying store rejected a write for violating a
    /// UNIQUE constraint (upc/asin ownership).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code == rusqlite::ErrorCode::ConstraintViolation
            }
            Self::DuplicateIdentifier(_) => true,
            _ => false,
        }
    }
}

/// Exit codes matching the CLI specification.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    Conflict = 7,
    ConfirmRequired = 8,
}

pub type Result<T> = std::result::Result<T, LotbookError>;
