use thiserror::Error;

/// Errors that can occur when interacting with a product or order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A value does not fit the column or Rust type it is converted to.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// The store refused the operation (used by the in-memory stores to
    /// simulate connection failures).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
