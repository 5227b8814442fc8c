//! Error types for the permissions module.

use thiserror::Error;

use tokengate_core::AssetRef;

/// Errors that can occur in the registry, ledger, and grant components.
#[derive(Debug, Error)]
pub enum PermsError {
    /// Single-shot provisioning found an existing registry.
    #[error("registry already provisioned for {0}")]
    AlreadyProvisioned(AssetRef),

    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] tokengate_store::StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] tokengate_core::CoreError),

    /// Notification encoding error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
