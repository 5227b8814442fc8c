//! Ownership oracle: the external source of truth for asset ownership.
//!
//! The engine only consumes [`OwnershipOracle::owner_of`]. Transfers flow
//! the other way: the oracle adapter reports each confirmed ownership change
//! to a [`TransferListener`] exactly once.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, Weak};

use async_trait::async_trait;
use thiserror::Error;

use tokengate_core::{AssetRef, Identity};

use crate::error::{EngineError, Result};
use crate::locks::AssetLocks;

/// Errors reported by an ownership oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The asset was never minted or has been burned.
    #[error("asset not found: {0}")]
    NotFound(AssetRef),

    /// The asset already has an owner.
    #[error("asset already minted: {0}")]
    AlreadyMinted(AssetRef),

    /// An ownership change on the asset is still being delivered.
    #[error("transfer of {0} in progress")]
    TransferInProgress(AssetRef),

    /// Listeners rejected an ownership change, which was rolled back.
    #[error("{failed} transfer listener(s) failed for {asset}: {first}")]
    ListenersFailed {
        asset: AssetRef,
        failed: usize,
        first: String,
    },

    /// The oracle could not answer.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Answers "who currently owns this asset".
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// The asset's current owner.
    async fn owner_of(&self, asset: &AssetRef) -> std::result::Result<Identity, OracleError>;
}

/// Receives one call per confirmed ownership change.
///
/// An oracle must not answer `owner_of` with the new owner before every
/// listener has returned; otherwise a grant written in that window lands
/// under the old generation and dies with the bump.
#[async_trait]
pub trait TransferListener: Send + Sync {
    /// The asset changed hands.
    async fn on_asset_transferred(&self, asset: &AssetRef) -> Result<()>;
}

#[async_trait]
impl<T: OwnershipOracle + ?Sized> OwnershipOracle for Arc<T> {
    async fn owner_of(&self, asset: &AssetRef) -> std::result::Result<Identity, OracleError> {
        (**self).owner_of(asset).await
    }
}

#[derive(Default)]
struct Ledger {
    owners: HashMap<AssetRef, Identity>,
    /// Assets whose ownership change is being delivered to listeners.
    pending: HashSet<AssetRef>,
}

/// In-memory token registry with mint, transfer, and burn.
///
/// Transfers and burns of one asset are serialized. While listeners run the
/// asset reports [`OracleError::TransferInProgress`]. Every listener is
/// called even if an earlier one fails; any failure rolls the ownership
/// change back. Listeners are held weakly; a dropped listener is skipped.
#[derive(Default)]
pub struct MemoryOracle {
    ledger: RwLock<Ledger>,
    listeners: RwLock<Vec<Weak<dyn TransferListener>>>,
    transfers: AssetLocks,
}

impl MemoryOracle {
    /// Create an empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for ownership changes.
    pub fn subscribe(&self, listener: &Arc<dyn TransferListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::downgrade(listener));
    }

    /// Give `owner` a fresh asset. Minting is not an ownership change.
    pub fn mint(&self, asset: AssetRef, owner: Identity) -> std::result::Result<(), OracleError> {
        let mut ledger = self.ledger.write().unwrap_or_else(|e| e.into_inner());
        if ledger.pending.contains(&asset) {
            return Err(OracleError::TransferInProgress(asset));
        }
        if ledger.owners.contains_key(&asset) {
            return Err(OracleError::AlreadyMinted(asset));
        }
        ledger.owners.insert(asset, owner);
        Ok(())
    }

    /// Move the asset to `to` and notify listeners.
    pub async fn transfer(&self, asset: &AssetRef, to: Identity) -> Result<()> {
        let _guard = self.transfers.lock(asset).await;
        let previous = self.begin(asset, Some(to))?;
        tracing::debug!(%asset, to = %to, "asset transferred");
        self.settle(asset, previous).await
    }

    /// Destroy the asset and notify listeners.
    pub async fn burn(&self, asset: &AssetRef) -> Result<()> {
        let _guard = self.transfers.lock(asset).await;
        let previous = self.begin(asset, None)?;
        tracing::debug!(%asset, "asset burned");
        self.settle(asset, previous).await
    }

    /// Apply the change and mark the asset pending. Returns the old owner.
    fn begin(&self, asset: &AssetRef, next: Option<Identity>) -> Result<Identity> {
        let mut ledger = self.ledger.write().unwrap_or_else(|e| e.into_inner());
        let previous = *ledger
            .owners
            .get(asset)
            .ok_or(OracleError::NotFound(*asset))?;

        match next {
            Some(to) => ledger.owners.insert(*asset, to),
            None => ledger.owners.remove(asset),
        };
        ledger.pending.insert(*asset);
        Ok(previous)
    }

    /// Deliver the change, then clear the pending mark or roll back.
    async fn settle(&self, asset: &AssetRef, previous: Identity) -> Result<()> {
        let failures = self.notify(asset).await;

        let mut ledger = self.ledger.write().unwrap_or_else(|e| e.into_inner());
        ledger.pending.remove(asset);
        let first = match failures.first() {
            Some(err) => err.to_string(),
            None => return Ok(()),
        };

        ledger.owners.insert(*asset, previous);
        tracing::warn!(%asset, failed = failures.len(), "ownership change rolled back");
        Err(OracleError::ListenersFailed {
            asset: *asset,
            failed: failures.len(),
            first,
        }
        .into())
    }

    async fn notify(&self, asset: &AssetRef) -> Vec<EngineError> {
        let listeners: Vec<Arc<dyn TransferListener>> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|listener| listener.upgrade())
            .collect();

        let mut failures = Vec::new();
        for listener in listeners {
            if let Err(err) = listener.on_asset_transferred(asset).await {
                tracing::warn!(%asset, error = %err, "transfer listener failed");
                failures.push(err);
            }
        }
        failures
    }
}

#[async_trait]
impl OwnershipOracle for MemoryOracle {
    async fn owner_of(&self, asset: &AssetRef) -> std::result::Result<Identity, OracleError> {
        let ledger = self.ledger.read().unwrap_or_else(|e| e.into_inner());
        if ledger.pending.contains(asset) {
            return Err(OracleError::TransferInProgress(*asset));
        }
        ledger
            .owners
            .get(asset)
            .copied()
            .ok_or(OracleError::NotFound(*asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokengate_core::CollectionId;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl TransferListener for Counter {
        async fn on_asset_transferred(&self, _asset: &AssetRef) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails every call; records the owner it observed.
    #[derive(Default)]
    struct Failing {
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<std::result::Result<Identity, OracleError>>>,
        oracle: std::sync::OnceLock<Weak<MemoryOracle>>,
    }

    #[async_trait]
    impl TransferListener for Failing {
        async fn on_asset_transferred(&self, asset: &AssetRef) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(oracle) = self.oracle.get().and_then(|o| o.upgrade()) {
                let seen = oracle.owner_of(asset).await;
                self.seen.lock().unwrap().push(seen);
            }
            Err(OracleError::Unavailable("listener down".into()).into())
        }
    }

    fn asset() -> AssetRef {
        AssetRef::new(CollectionId::from_bytes([8; 32]), 1)
    }

    #[tokio::test]
    async fn test_mint_transfer_burn() {
        let oracle = MemoryOracle::new();
        let alice = Identity::from_bytes([1; 32]);
        let bob = Identity::from_bytes([2; 32]);

        assert_eq!(
            oracle.owner_of(&asset()).await,
            Err(OracleError::NotFound(asset()))
        );

        oracle.mint(asset(), alice).unwrap();
        assert_eq!(oracle.mint(asset(), bob), Err(OracleError::AlreadyMinted(asset())));
        assert_eq!(oracle.owner_of(&asset()).await, Ok(alice));

        oracle.transfer(&asset(), bob).await.unwrap();
        assert_eq!(oracle.owner_of(&asset()).await, Ok(bob));

        oracle.burn(&asset()).await.unwrap();
        assert!(oracle.owner_of(&asset()).await.is_err());
        assert!(oracle.burn(&asset()).await.is_err());
    }

    #[tokio::test]
    async fn test_listener_called_once_per_change() {
        let oracle = MemoryOracle::new();
        let counter = Arc::new(Counter::default());
        let listener: Arc<dyn TransferListener> = counter.clone();
        oracle.subscribe(&listener);

        oracle.mint(asset(), Identity::from_bytes([1; 32])).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);

        oracle
            .transfer(&asset(), Identity::from_bytes([2; 32]))
            .await
            .unwrap();
        oracle.burn(&asset()).await.unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_listener_is_skipped() {
        let oracle = MemoryOracle::new();
        {
            let listener: Arc<dyn TransferListener> = Arc::new(Counter::default());
            oracle.subscribe(&listener);
        }

        oracle.mint(asset(), Identity::from_bytes([1; 32])).unwrap();
        oracle
            .transfer(&asset(), Identity::from_bytes([2; 32]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_listener_rolls_back_after_notifying_all() {
        let oracle = Arc::new(MemoryOracle::new());
        let alice = Identity::from_bytes([1; 32]);
        let bob = Identity::from_bytes([2; 32]);

        let failing = Arc::new(Failing::default());
        failing.oracle.set(Arc::downgrade(&oracle)).unwrap();
        let counter = Arc::new(Counter::default());
        let first: Arc<dyn TransferListener> = failing.clone();
        let second: Arc<dyn TransferListener> = counter.clone();
        oracle.subscribe(&first);
        oracle.subscribe(&second);

        oracle.mint(asset(), alice).unwrap();
        let err = oracle.transfer(&asset(), bob).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::Oracle(OracleError::ListenersFailed { failed: 1, .. })
        ));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(oracle.owner_of(&asset()).await, Ok(alice));

        // Mid-delivery the asset had no answerable owner.
        assert_eq!(
            failing.seen.lock().unwrap().as_slice(),
            &[Err(OracleError::TransferInProgress(asset()))]
        );
    }

    #[tokio::test]
    async fn test_failed_burn_restores_owner() {
        let oracle = MemoryOracle::new();
        let alice = Identity::from_bytes([1; 32]);
        let failing: Arc<dyn TransferListener> = Arc::new(Failing::default());
        oracle.subscribe(&failing);

        oracle.mint(asset(), alice).unwrap();
        assert!(oracle.burn(&asset()).await.is_err());
        assert_eq!(oracle.owner_of(&asset()).await, Ok(alice));
    }
}
