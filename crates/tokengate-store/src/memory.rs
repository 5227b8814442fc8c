//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite, nothing persisted. Registries live in an arena:
//! handle `h` owns slot `h - 1` of the generation and grant vectors.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use tokengate_core::{AssetRef, Generation, GrantRecord, Identity, RegistryHandle};

use crate::error::{Result, StoreError};
use crate::traits::{Bumped, GrantView, Provisioned, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Directory: asset -> handle.
    handles: HashMap<AssetRef, RegistryHandle>,

    /// Arena of registries, indexed by `handle - 1`.
    registries: Vec<Registry>,
}

struct Registry {
    asset: AssetRef,
    generation: Generation,
    grants: HashMap<Identity, GrantRecord>,
}

impl MemoryStoreInner {
    fn slot(handle: RegistryHandle) -> Option<usize> {
        usize::try_from(handle.get()).ok()?.checked_sub(1)
    }

    fn registry(&self, handle: RegistryHandle) -> Option<&Registry> {
        self.registries.get(Self::slot(handle)?)
    }

    fn registry_mut(&mut self, handle: RegistryHandle) -> Option<&mut Registry> {
        let slot = Self::slot(handle)?;
        self.registries.get_mut(slot)
    }

    fn provision(&mut self, asset: &AssetRef) -> Provisioned {
        if let Some(&handle) = self.handles.get(asset) {
            return Provisioned {
                handle,
                created: false,
            };
        }

        self.registries.push(Registry {
            asset: *asset,
            generation: Generation::INITIAL,
            grants: HashMap::new(),
        });
        let handle = RegistryHandle(self.registries.len() as u64);
        self.handles.insert(*asset, handle);

        Provisioned {
            handle,
            created: true,
        }
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_or_get_registry(&self, asset: &AssetRef) -> Result<Provisioned> {
        Ok(self.write()?.provision(asset))
    }

    async fn lookup_registry(&self, asset: &AssetRef) -> Result<Option<RegistryHandle>> {
        Ok(self.read()?.handles.get(asset).copied())
    }

    async fn list_registries(&self) -> Result<Vec<(AssetRef, RegistryHandle)>> {
        let inner = self.read()?;
        Ok(inner
            .registries
            .iter()
            .enumerate()
            .map(|(i, r)| (r.asset, RegistryHandle(i as u64 + 1)))
            .collect())
    }

    async fn generation(&self, asset: &AssetRef) -> Result<Generation> {
        let inner = self.read()?;
        Ok(inner
            .handles
            .get(asset)
            .and_then(|&h| inner.registry(h))
            .map(|r| r.generation)
            .unwrap_or(Generation::INITIAL))
    }

    async fn bump_generation(&self, asset: &AssetRef) -> Result<Bumped> {
        let mut inner = self.write()?;
        let provisioned = inner.provision(asset);

        let registry = inner
            .registry_mut(provisioned.handle)
            .ok_or(StoreError::UnknownRegistry(provisioned.handle))?;
        registry.generation = registry.generation.next()?;

        Ok(Bumped {
            handle: provisioned.handle,
            generation: registry.generation,
            registry_created: provisioned.created,
        })
    }

    async fn put_grant(&self, handle: RegistryHandle, record: &GrantRecord) -> Result<()> {
        let mut inner = self.write()?;
        let registry = inner
            .registry_mut(handle)
            .ok_or(StoreError::UnknownRegistry(handle))?;
        registry.grants.insert(record.grantee, record.clone());
        Ok(())
    }

    async fn get_grant(
        &self,
        handle: RegistryHandle,
        grantee: &Identity,
    ) -> Result<Option<GrantRecord>> {
        let inner = self.read()?;
        Ok(inner
            .registry(handle)
            .and_then(|r| r.grants.get(grantee))
            .cloned())
    }

    async fn grant_view(&self, asset: &AssetRef, grantee: &Identity) -> Result<GrantView> {
        let inner = self.read()?;

        let Some(&handle) = inner.handles.get(asset) else {
            return Ok(GrantView::unprovisioned());
        };
        let registry = inner
            .registry(handle)
            .ok_or(StoreError::UnknownRegistry(handle))?;

        Ok(GrantView {
            handle: Some(handle),
            generation: registry.generation,
            record: registry.grants.get(grantee).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokengate_core::{CollectionId, PermissionMask};

    fn asset(token_id: u64) -> AssetRef {
        AssetRef::new(CollectionId::from_bytes([0xaa; 32]), token_id)
    }

    fn record(grantee: Identity, generation: Generation) -> GrantRecord {
        GrantRecord {
            grantee,
            mask: PermissionMask::from(816u64),
            expiration: 5_000,
            source: "test".to_string(),
            generation_at_grant: generation,
        }
    }

    #[tokio::test]
    async fn test_memory_store_provision_idempotent() {
        let store = MemoryStore::new();

        let first = store.create_or_get_registry(&asset(1)).await.unwrap();
        assert!(first.created);
        assert_eq!(first.handle, RegistryHandle(1));

        let second = store.create_or_get_registry(&asset(1)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.handle, first.handle);

        let other = store.create_or_get_registry(&asset(2)).await.unwrap();
        assert_eq!(other.handle, RegistryHandle(2));
    }

    #[tokio::test]
    async fn test_memory_store_generation_defaults() {
        let store = MemoryStore::new();

        assert_eq!(store.generation(&asset(1)).await.unwrap(), Generation(1));

        let bumped = store.bump_generation(&asset(1)).await.unwrap();
        assert!(bumped.registry_created);
        assert_eq!(bumped.generation, Generation(2));

        let bumped = store.bump_generation(&asset(1)).await.unwrap();
        assert!(!bumped.registry_created);
        assert_eq!(bumped.generation, Generation(3));
    }

    #[tokio::test]
    async fn test_memory_store_grant_overwrite() {
        let store = MemoryStore::new();
        let handle = store.create_or_get_registry(&asset(1)).await.unwrap().handle;
        let grantee = Identity::from_bytes([1; 32]);

        store
            .put_grant(handle, &record(grantee, Generation(1)))
            .await
            .unwrap();

        let mut replacement = record(grantee, Generation(1));
        replacement.mask = PermissionMask::from(3u64);
        store.put_grant(handle, &replacement).await.unwrap();

        let stored = store.get_grant(handle, &grantee).await.unwrap().unwrap();
        assert_eq!(stored, replacement);
    }

    #[tokio::test]
    async fn test_memory_store_unknown_handle() {
        let store = MemoryStore::new();
        let grantee = Identity::from_bytes([1; 32]);

        let result = store
            .put_grant(RegistryHandle(9), &record(grantee, Generation(1)))
            .await;
        assert!(matches!(result, Err(StoreError::UnknownRegistry(_))));

        let result = store.put_grant(RegistryHandle(0), &record(grantee, Generation(1))).await;
        assert!(matches!(result, Err(StoreError::UnknownRegistry(_))));
    }

    #[tokio::test]
    async fn test_memory_store_view_tracks_bump() {
        let store = MemoryStore::new();
        let handle = store.create_or_get_registry(&asset(1)).await.unwrap().handle;
        let grantee = Identity::from_bytes([1; 32]);
        store
            .put_grant(handle, &record(grantee, Generation(1)))
            .await
            .unwrap();

        let view = store.grant_view(&asset(1), &grantee).await.unwrap();
        assert_eq!(view.generation, Generation(1));
        assert!(view.record.is_some());

        store.bump_generation(&asset(1)).await.unwrap();

        let view = store.grant_view(&asset(1), &grantee).await.unwrap();
        assert_eq!(view.generation, Generation(2));
        // Record is still physically present; liveness is decided by the reader.
        assert_eq!(view.record.unwrap().generation_at_grant, Generation(1));

        let unseen = store.grant_view(&asset(5), &grantee).await.unwrap();
        assert_eq!(unseen, GrantView::unprovisioned());
    }
}
