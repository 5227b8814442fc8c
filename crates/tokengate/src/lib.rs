//! # Tokengate
//!
//! Fine-grained, time-bounded permissions over externally owned assets,
//! where only the asset's current owner may grant.
//!
//! ## Overview
//!
//! An asset is one token of one collection. Its owner grants capability
//! slots to grantees, each grant carrying an expiration and an opaque
//! provenance tag. When the asset changes hands, every outstanding grant on
//! it dies at once: the asset's generation moves forward and grants issued
//! under an older generation no longer match.
//!
//! ## Key Concepts
//!
//! - **PermissionMask**: 256 bits, slot `i` granted when bits `2i` and
//!   `2i + 1` are both set
//! - **Generation**: per-asset counter, +1 per ownership change
//! - **Registry**: per-asset grant table, provisioned on first use
//! - **OwnershipOracle**: the external answer to "who owns this asset"
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokengate::{AccessEngine, EngineConfig, GrantRequest, MemoryOracle, TransferListener};
//! use tokengate::core::{AssetRef, CollectionId, Identity, PermissionMask};
//! use tokengate::store::SqliteStore;
//!
//! async fn example() -> tokengate::Result<()> {
//!     let owner = Identity::from_bytes([1; 32]);
//!     let grantee = Identity::from_bytes([2; 32]);
//!     let asset = AssetRef::new(CollectionId::from_bytes([3; 32]), 1);
//!
//!     let oracle = Arc::new(MemoryOracle::new());
//!     oracle.mint(asset, owner)?;
//!
//!     let store = SqliteStore::open("tokengate.db")?;
//!     let engine = Arc::new(AccessEngine::new(store, oracle.clone(), EngineConfig::default())?);
//!
//!     // Transfers reported by the oracle bump the asset's generation.
//!     let listener: Arc<dyn TransferListener> = engine.clone();
//!     oracle.subscribe(&listener);
//!
//!     let request = GrantRequest::new(grantee, PermissionMask::from(816u64), i64::MAX, "ipfs://terms");
//!     engine.set_permissions(owner, &asset, request).await?;
//!
//!     assert!(engine.has_permission(&asset, &grantee, 4).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `tokengate::core` - identifiers, masks, codec, records
//! - `tokengate::store` - storage abstraction, SQLite and in-memory stores
//! - `tokengate::perms` - directory, ledger, grant store, notifications

pub mod clock;
pub mod engine;
pub mod error;
pub mod locks;
pub mod oracle;

// Re-export component crates
pub use tokengate_core as core;
pub use tokengate_perms as perms;
pub use tokengate_store as store;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AccessEngine, EmptyGrantPolicy, EngineConfig, GrantRequest, SetOutcome};
pub use error::{EngineError, Result};
pub use oracle::{MemoryOracle, OracleError, OwnershipOracle, TransferListener};

// Re-export commonly used core types
pub use tokengate_core::{
    AssetRef, CollectionId, Generation, GrantRecord, Identity, PermissionCodec, PermissionMask,
    RegistryHandle, Timestamp,
};
pub use tokengate_perms::{GrantState, NoGrantReason, Notification};
