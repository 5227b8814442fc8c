//! Per-asset mutation locks.
//!
//! Each asset maps to one of a fixed set of async mutexes. Two assets may
//! share a shard; one asset never spans two.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tokio::sync::{Mutex, MutexGuard};

use tokengate_core::AssetRef;

/// Default number of lock shards.
pub const DEFAULT_SHARDS: usize = 64;

/// Sharded table of per-asset locks.
#[derive(Debug)]
pub struct AssetLocks {
    shards: Vec<Mutex<()>>,
}

impl AssetLocks {
    /// Create a table with `shards` locks (at least one).
    pub fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Wait for exclusive access to `asset`.
    pub async fn lock(&self, asset: &AssetRef) -> MutexGuard<'_, ()> {
        self.shards[self.shard_of(asset)].lock().await
    }

    fn shard_of(&self, asset: &AssetRef) -> usize {
        let mut hasher = DefaultHasher::new();
        asset.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }
}

impl Default for AssetLocks {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}
