//! Error types for the store module.

use thiserror::Error;

use tokengate_core::{CoreError, RegistryHandle};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A grant was written against a handle no registry owns.
    #[error("unknown registry: {0}")]
    UnknownRegistry(RegistryHandle),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Core error (generation overflow, encoding).
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The connection mutex was poisoned or a blocking task died.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
