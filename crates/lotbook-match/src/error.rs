use thiserror::Error;

use lotbook_core::LotbookError;

#[derive(Debug, Error)]
pub enum MatchError {
    /// A save collided with an identifier owned by another record even after
    /// the conflict redirect. Callers should surface "likely duplicate
    /// identifier" to the operator, not retry.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("product not found: {0}")]
    ProductNotFound(i64),

    #[error("store error: {0}")]
    Store(#[from] LotbookError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
