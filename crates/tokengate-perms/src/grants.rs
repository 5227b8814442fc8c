//! Grant store: keyed grant records per registry.
//!
//! Records are keyed by `(handle, grantee)`. The generation a grant was
//! issued under lives inside the record, not in the key.

use std::sync::Arc;

use tokengate_core::{AssetRef, GrantRecord, Identity, RegistryHandle};
use tokengate_store::{GrantView, Store};

use crate::error::Result;

/// Owns the grant records of every registry.
pub struct GrantStore<S: Store> {
    store: Arc<S>,
}

impl<S: Store> GrantStore<S> {
    /// Create a grant store over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Replace the grantee's record. No merging with the previous record.
    pub async fn put(&self, handle: RegistryHandle, record: &GrantRecord) -> Result<()> {
        self.store.put_grant(handle, record).await?;
        tracing::debug!(
            %handle,
            grantee = %record.grantee,
            mask = %record.mask,
            generation = %record.generation_at_grant,
            "grant written"
        );
        Ok(())
    }

    /// The grantee's stored record, live or dead.
    pub async fn get(
        &self,
        handle: RegistryHandle,
        grantee: &Identity,
    ) -> Result<Option<GrantRecord>> {
        Ok(self.store.get_grant(handle, grantee).await?)
    }

    /// Current generation and record of the grantee, read together.
    pub async fn view(&self, asset: &AssetRef, grantee: &Identity) -> Result<GrantView> {
        Ok(self.store.grant_view(asset, grantee).await?)
    }
}
