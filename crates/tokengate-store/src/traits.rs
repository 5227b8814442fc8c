//! Store trait: the abstract interface for grant persistence.
//!
//! This trait keeps the permission components storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (tests).

use async_trait::async_trait;
use tokengate_core::{AssetRef, Generation, GrantRecord, Identity, RegistryHandle};

use crate::error::Result;

/// Result of provisioning a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    /// The registry handle bound to the asset.
    pub handle: RegistryHandle,
    /// Whether this call created the registry.
    pub created: bool,
}

/// Result of advancing an asset's generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bumped {
    /// The registry handle bound to the asset.
    pub handle: RegistryHandle,
    /// The generation after the bump.
    pub generation: Generation,
    /// Whether the bump had to provision the registry first.
    pub registry_created: bool,
}

/// A consistent snapshot of one grantee's slot on one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantView {
    /// Registry handle, if the asset was ever provisioned.
    pub handle: Option<RegistryHandle>,
    /// Current generation of the asset.
    pub generation: Generation,
    /// The stored record, live or dead.
    pub record: Option<GrantRecord>,
}

impl GrantView {
    /// View of an asset that was never provisioned.
    pub fn unprovisioned() -> Self {
        Self {
            handle: None,
            generation: Generation::INITIAL,
            record: None,
        }
    }
}

/// The Store trait: async interface over the three persisted tables.
///
/// # Design Notes
///
/// - **Atomicity**: each method runs as a single critical section, so a
///   reader never sees a generation without the matching grant row.
/// - **Lazy defaults**: unseen assets report [`Generation::INITIAL`].
/// - **Handles**: allocated sequentially from 1, never reused.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Registry Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Return the asset's registry, creating it (with an empty grant table
    /// and generation 1) if none exists.
    async fn create_or_get_registry(&self, asset: &AssetRef) -> Result<Provisioned>;

    /// Look up the asset's registry without provisioning.
    async fn lookup_registry(&self, asset: &AssetRef) -> Result<Option<RegistryHandle>>;

    /// All provisioned registries, ordered by handle.
    async fn list_registries(&self) -> Result<Vec<(AssetRef, RegistryHandle)>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Generation Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Current generation of the asset, [`Generation::INITIAL`] if unseen.
    async fn generation(&self, asset: &AssetRef) -> Result<Generation>;

    /// Advance the asset's generation by one, provisioning it first if needed.
    async fn bump_generation(&self, asset: &AssetRef) -> Result<Bumped>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the grantee's record in the registry.
    ///
    /// Fails with `UnknownRegistry` if the handle was never allocated.
    async fn put_grant(&self, handle: RegistryHandle, record: &GrantRecord) -> Result<()>;

    /// Read the grantee's record, live or dead.
    async fn get_grant(
        &self,
        handle: RegistryHandle,
        grantee: &Identity,
    ) -> Result<Option<GrantRecord>>;

    /// Read the asset's generation and the grantee's record together.
    async fn grant_view(&self, asset: &AssetRef, grantee: &Identity) -> Result<GrantView>;
}
