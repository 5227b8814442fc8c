//! Version ledger: per-asset ownership generations.
//!
//! Bumping the generation is the whole revocation mechanism. Records issued
//! under an older generation are left in place and simply stop matching.

use std::sync::Arc;

use tokengate_core::{AssetRef, Generation};
use tokengate_store::Store;

use crate::error::Result;
use crate::events::{EventBus, Notification};

/// Owns the generation counter of every asset.
pub struct VersionLedger<S: Store> {
    store: Arc<S>,
    events: EventBus,
}

impl<S: Store> VersionLedger<S> {
    /// Create a ledger over `store`, announcing bumps on `events`.
    pub fn new(store: Arc<S>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Current generation; [`Generation::INITIAL`] for unseen assets.
    pub async fn current_generation(&self, asset: &AssetRef) -> Result<Generation> {
        Ok(self.store.generation(asset).await?)
    }

    /// Advance the asset's generation by exactly one.
    ///
    /// Unconditional: every call is one ownership change. Callers must
    /// filter duplicate transfer notifications before reaching here.
    pub async fn bump(&self, asset: &AssetRef) -> Result<Generation> {
        let bumped = self.store.bump_generation(asset).await?;

        if bumped.registry_created {
            self.events.emit(Notification::RegistryCreated {
                asset: *asset,
                handle: bumped.handle,
            });
        }

        tracing::info!(%asset, generation = %bumped.generation, "generation bumped");
        self.events.emit(Notification::VersionBumped {
            asset: *asset,
            generation: bumped.generation,
        });

        Ok(bumped.generation)
    }
}
