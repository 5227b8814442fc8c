//! Error types for the engine.

use thiserror::Error;

use tokengate_core::{AssetRef, CoreError, Identity};
use tokengate_perms::PermsError;
use tokengate_store::StoreError;

use crate::oracle::OracleError;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller does not own the asset.
    #[error("unauthorized: {0}")]
    Unauthorized(Identity),

    /// The asset is malformed or does not resolve to an owner.
    #[error("invalid asset reference: {0}")]
    InvalidAssetReference(AssetRef),

    /// The grantee is the null identity.
    #[error("grantee is the null identity")]
    ZeroGrantee,

    /// Slot index outside the configured vocabulary.
    #[error("slot {slot} out of range (vocabulary has {slots} slots)")]
    SlotOutOfRange { slot: u16, slots: u16 },

    /// Single-shot provisioning found an existing registry.
    #[error("registry already provisioned for {0}")]
    AlreadyProvisioned(AssetRef),

    /// Ownership oracle error outside the mutation path.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(CoreError),

    /// Notification encoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SlotOutOfRange { slot, slots } => EngineError::SlotOutOfRange { slot, slots },
            other => EngineError::Core(other),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => core.into(),
            other => EngineError::Store(other),
        }
    }
}

impl From<PermsError> for EngineError {
    fn from(err: PermsError) -> Self {
        match err {
            PermsError::AlreadyProvisioned(asset) => EngineError::AlreadyProvisioned(asset),
            PermsError::Store(store) => store.into(),
            PermsError::Core(core) => core.into(),
            PermsError::SerializationError(msg) => EngineError::Serialization(msg),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tokengate_core::CollectionId;

    #[test]
    fn test_slot_error_is_lifted_from_any_layer() {
        let core = CoreError::SlotOutOfRange { slot: 9, slots: 8 };
        assert!(matches!(
            EngineError::from(PermsError::Store(StoreError::Core(core))),
            EngineError::SlotOutOfRange { slot: 9, slots: 8 }
        ));
    }

    #[test]
    fn test_already_provisioned_is_lifted() {
        let asset = AssetRef::new(CollectionId::from_bytes([1; 32]), 1);
        assert!(matches!(
            EngineError::from(PermsError::AlreadyProvisioned(asset)),
            EngineError::AlreadyProvisioned(a) if a == asset
        ));
    }
}
