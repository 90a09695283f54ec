//! # Store Errors

use thiserror::Error;

/// Convenience alias used by every collaborator trait.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure inside a collaborator. The engine never retries these.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded migrations failed to apply.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Referential or uniqueness rule violated by stored or seeded data.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// A stored row could not be decoded into a domain type.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// Catalog seed file could not be parsed.
    #[error("seed error: {0}")]
    Seed(String),

    /// IO error while reading a seed file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
