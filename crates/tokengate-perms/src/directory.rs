//! Registry directory: lazy, idempotent per-asset provisioning.

use std::sync::Arc;

use tokengate_core::{AssetRef, RegistryHandle};
use tokengate_store::Store;

use crate::error::{PermsError, Result};
use crate::events::{EventBus, Notification};

/// Maps assets to their registry handles, provisioning on demand.
pub struct RegistryDirectory<S: Store> {
    store: Arc<S>,
    events: EventBus,
}

impl<S: Store> RegistryDirectory<S> {
    /// Create a directory over `store`, announcing creations on `events`.
    pub fn new(store: Arc<S>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Return the asset's handle, creating the registry on first use.
    ///
    /// Creation is atomic and announced exactly once; later calls return the
    /// same handle silently.
    pub async fn create_or_get(&self, asset: &AssetRef) -> Result<RegistryHandle> {
        let provisioned = self.store.create_or_get_registry(asset).await?;

        if provisioned.created {
            tracing::info!(%asset, handle = %provisioned.handle, "registry created");
            self.events.emit(Notification::RegistryCreated {
                asset: *asset,
                handle: provisioned.handle,
            });
        }

        Ok(provisioned.handle)
    }

    /// Provision the asset's registry, failing if one already exists.
    pub async fn provision_once(&self, asset: &AssetRef) -> Result<RegistryHandle> {
        let provisioned = self.store.create_or_get_registry(asset).await?;

        if !provisioned.created {
            return Err(PermsError::AlreadyProvisioned(*asset));
        }

        tracing::info!(%asset, handle = %provisioned.handle, "registry provisioned");
        self.events.emit(Notification::RegistryCreated {
            asset: *asset,
            handle: provisioned.handle,
        });
        Ok(provisioned.handle)
    }

    /// Look up the asset's handle without provisioning.
    pub async fn lookup(&self, asset: &AssetRef) -> Result<Option<RegistryHandle>> {
        Ok(self.store.lookup_registry(asset).await?)
    }

    /// Every provisioned registry, ordered by handle.
    pub async fn list(&self) -> Result<Vec<(AssetRef, RegistryHandle)>> {
        Ok(self.store.list_registries().await?)
    }
}
