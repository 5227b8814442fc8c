//! The engine: ownership-gated grant mutation and grant queries.
//!
//! The engine brings the registry directory, version ledger, and grant
//! store together behind one API, and consults the ownership oracle before
//! any mutation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use tokengate_core::{
    validate_asset_ref, validate_grantee, AssetRef, Generation, GrantRecord, Identity,
    PermissionCodec, PermissionMask, RegistryHandle, Timestamp, MAX_SLOTS,
};
use tokengate_perms::{
    EventBus, GrantState, GrantStore, Notification, RegistryDirectory, VersionLedger,
    DEFAULT_EVENT_CAPACITY,
};
use tokengate_store::{GrantView, Store};

use crate::clock::{Clock, SystemClock};
use crate::error::{EngineError, Result};
use crate::locks::{AssetLocks, DEFAULT_SHARDS};
use crate::oracle::{OwnershipOracle, TransferListener};

/// What `set_permissions` does with a request whose mask, expiration, or
/// source is zero-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyGrantPolicy {
    /// Write the zero-valued record like any other.
    #[default]
    Record,
    /// Accept the request and change nothing.
    Skip,
}

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of capability slots (1..=128).
    pub vocabulary_slots: u16,
    /// Handling of zero-valued grant requests.
    pub empty_grant_policy: EmptyGrantPolicy,
    /// Buffered notifications per subscriber.
    pub event_capacity: usize,
    /// Number of per-asset lock shards.
    ///
    /// A mutation holds its shard across the oracle lookup, so a slow
    /// oracle also stalls other assets hashed to the same shard. More
    /// shards make that rarer.
    pub lock_shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vocabulary_slots: MAX_SLOTS,
            empty_grant_policy: EmptyGrantPolicy::Record,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            lock_shards: DEFAULT_SHARDS,
        }
    }
}

/// Result of an accepted `set_permissions` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The record was written to the asset's registry.
    Written(RegistryHandle),
    /// The empty-grant policy turned the request into a no-op.
    Skipped,
}

/// A grant request, minus the caller and asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    pub grantee: Identity,
    pub mask: PermissionMask,
    pub expiration: Timestamp,
    pub source: String,
}

impl GrantRequest {
    pub fn new(
        grantee: Identity,
        mask: PermissionMask,
        expiration: Timestamp,
        source: impl Into<String>,
    ) -> Self {
        Self {
            grantee,
            mask,
            expiration,
            source: source.into(),
        }
    }

    /// Whether any field carries its zero value.
    pub fn is_empty(&self) -> bool {
        self.mask.is_zero() || self.expiration == 0 || self.source.is_empty()
    }
}

/// The access-control engine.
///
/// Provides:
/// - Lazy and single-shot registry provisioning
/// - Ownership-gated grant writes
/// - Grant queries against the current generation and clock
/// - Generation bumps on ownership change
pub struct AccessEngine<S: Store, O: OwnershipOracle> {
    /// Source of truth for ownership.
    oracle: O,
    /// Time source for expiry.
    clock: Arc<dyn Clock>,
    /// Configuration.
    config: EngineConfig,
    codec: PermissionCodec,
    directory: RegistryDirectory<S>,
    ledger: VersionLedger<S>,
    grants: GrantStore<S>,
    events: EventBus,
    locks: AssetLocks,
}

impl<S: Store, O: OwnershipOracle> AccessEngine<S, O> {
    /// Create an engine reading the system clock.
    pub fn new(store: S, oracle: O, config: EngineConfig) -> Result<Self> {
        Self::with_clock(store, oracle, Arc::new(SystemClock), config)
    }

    /// Create an engine with an explicit clock.
    pub fn with_clock(
        store: S,
        oracle: O,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Result<Self> {
        let codec = PermissionCodec::new(config.vocabulary_slots)?;
        let store = Arc::new(store);
        let events = EventBus::new(config.event_capacity);

        Ok(Self {
            oracle,
            clock,
            codec,
            directory: RegistryDirectory::new(store.clone(), events.clone()),
            ledger: VersionLedger::new(store.clone(), events.clone()),
            grants: GrantStore::new(store),
            events,
            locks: AssetLocks::new(config.lock_shards),
            config,
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The codec queries are evaluated with.
    pub fn codec(&self) -> &PermissionCodec {
        &self.codec
    }

    /// Subscribe to notifications emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Return the asset's registry handle, provisioning it on first use.
    pub async fn create_or_get(&self, asset: &AssetRef) -> Result<RegistryHandle> {
        check_asset(asset)?;
        let _guard = self.locks.lock(asset).await;
        Ok(self.directory.create_or_get(asset).await?)
    }

    /// Provision the asset's registry; fails if it already exists.
    pub async fn provision_once(&self, asset: &AssetRef) -> Result<RegistryHandle> {
        check_asset(asset)?;
        let _guard = self.locks.lock(asset).await;
        Ok(self.directory.provision_once(asset).await?)
    }

    /// The asset's registry handle, if provisioned.
    pub async fn lookup(&self, asset: &AssetRef) -> Result<Option<RegistryHandle>> {
        Ok(self.directory.lookup(asset).await?)
    }

    /// Every provisioned registry, ordered by handle.
    pub async fn list_registries(&self) -> Result<Vec<(AssetRef, RegistryHandle)>> {
        Ok(self.directory.list().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace `grantee`'s grant on `asset`.
    ///
    /// Only the asset's current owner may call this. Rejected calls change
    /// no state and emit nothing.
    pub async fn set_permissions(
        &self,
        caller: Identity,
        asset: &AssetRef,
        request: GrantRequest,
    ) -> Result<SetOutcome> {
        let _guard = self.locks.lock(asset).await;
        self.authorize(caller, asset, &request).await?;

        if self.skips(&request) {
            tracing::debug!(%asset, grantee = %request.grantee, "empty grant skipped");
            return Ok(SetOutcome::Skipped);
        }

        let handle = self.directory.create_or_get(asset).await?;
        self.write(asset, handle, request).await?;
        Ok(SetOutcome::Written(handle))
    }

    /// Provision the asset's registry and set the initial grant in one call.
    ///
    /// The registry is provisioned even when the empty-grant policy skips
    /// the write.
    pub async fn create_with_permissions(
        &self,
        caller: Identity,
        asset: &AssetRef,
        request: GrantRequest,
    ) -> Result<RegistryHandle> {
        let _guard = self.locks.lock(asset).await;
        self.authorize(caller, asset, &request).await?;

        let handle = self.directory.create_or_get(asset).await?;
        if self.skips(&request) {
            tracing::debug!(%asset, grantee = %request.grantee, "empty grant skipped");
        } else {
            self.write(asset, handle, request).await?;
        }
        Ok(handle)
    }

    /// Record one confirmed ownership change. Every stored grant on the
    /// asset stops being live; none is touched.
    pub async fn on_asset_transferred(&self, asset: &AssetRef) -> Result<Generation> {
        check_asset(asset)?;
        let _guard = self.locks.lock(asset).await;
        Ok(self.ledger.bump(asset).await?)
    }

    async fn authorize(
        &self,
        caller: Identity,
        asset: &AssetRef,
        request: &GrantRequest,
    ) -> Result<()> {
        check_asset(asset)?;

        let owner = match self.oracle.owner_of(asset).await {
            Ok(owner) => owner,
            Err(err) => {
                tracing::warn!(%asset, error = %err, "ownership lookup failed");
                return Err(EngineError::InvalidAssetReference(*asset));
            }
        };

        if caller != owner {
            tracing::warn!(%asset, caller = %caller, "grant rejected: caller is not owner");
            return Err(EngineError::Unauthorized(caller));
        }

        validate_grantee(&request.grantee).map_err(|_| EngineError::ZeroGrantee)?;
        Ok(())
    }

    fn skips(&self, request: &GrantRequest) -> bool {
        self.config.empty_grant_policy == EmptyGrantPolicy::Skip && request.is_empty()
    }

    async fn write(
        &self,
        asset: &AssetRef,
        handle: RegistryHandle,
        request: GrantRequest,
    ) -> Result<()> {
        let generation = self.ledger.current_generation(asset).await?;
        let record = GrantRecord {
            grantee: request.grantee,
            mask: request.mask,
            expiration: request.expiration,
            source: request.source,
            generation_at_grant: generation,
        };
        self.grants.put(handle, &record).await?;

        self.events.emit(Notification::PermissionsSet {
            asset: *asset,
            mask: record.mask,
            grantee: record.grantee,
            expiration: record.expiration,
            source: record.source,
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Effective grant of `grantee` on `asset` right now.
    pub async fn grant_state(&self, asset: &AssetRef, grantee: &Identity) -> Result<GrantState> {
        let view = if asset.is_well_formed() {
            self.grants.view(asset, grantee).await?
        } else {
            GrantView::unprovisioned()
        };
        Ok(GrantState::derive(view, self.clock.now()))
    }

    /// Whether `grantee` currently holds `slot` on `asset`.
    pub async fn has_permission(
        &self,
        asset: &AssetRef,
        grantee: &Identity,
        slot: u16,
    ) -> Result<bool> {
        self.codec.check_slot(slot)?;
        let state = self.grant_state(asset, grantee).await?;
        Ok(state.has_permission(&self.codec, slot)?)
    }

    /// Whether `grantee` currently holds every bit of `query` on `asset`.
    pub async fn has_permissions(
        &self,
        asset: &AssetRef,
        grantee: &Identity,
        query: &PermissionMask,
    ) -> Result<bool> {
        let state = self.grant_state(asset, grantee).await?;
        Ok(state.has_permissions(&self.codec, query))
    }

    /// The subset of `query` that `grantee` currently holds on `asset`.
    pub async fn get_permissions(
        &self,
        asset: &AssetRef,
        grantee: &Identity,
        query: &PermissionMask,
    ) -> Result<PermissionMask> {
        let state = self.grant_state(asset, grantee).await?;
        Ok(state.get_permissions(&self.codec, query))
    }

    /// The stored record, live or dead.
    pub async fn permission_record(
        &self,
        asset: &AssetRef,
        grantee: &Identity,
    ) -> Result<Option<GrantRecord>> {
        if !asset.is_well_formed() {
            return Ok(None);
        }
        Ok(self.grants.view(asset, grantee).await?.record)
    }

    /// The asset's current ownership generation.
    pub async fn current_generation(&self, asset: &AssetRef) -> Result<Generation> {
        Ok(self.ledger.current_generation(asset).await?)
    }
}

#[async_trait]
impl<S: Store, O: OwnershipOracle> TransferListener for AccessEngine<S, O> {
    async fn on_asset_transferred(&self, asset: &AssetRef) -> Result<()> {
        AccessEngine::on_asset_transferred(self, asset).await?;
        Ok(())
    }
}

fn check_asset(asset: &AssetRef) -> Result<()> {
    validate_asset_ref(asset).map_err(|_| EngineError::InvalidAssetReference(*asset))
}
