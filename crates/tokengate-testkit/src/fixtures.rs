//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an engine wired to an in-memory
//! oracle and a manual clock, with one minted asset.

use std::sync::Arc;

use rand::RngCore;

use tokengate::{
    AccessEngine, EngineConfig, GrantRequest, ManualClock, MemoryOracle, TransferListener,
};
use tokengate_core::{AssetRef, CollectionId, Identity, PermissionMask, Timestamp};
use tokengate_store::{MemoryStore, Store};

/// Clock reading every fixture starts at.
pub const FIXTURE_NOW: Timestamp = 1_736_870_400_000;

/// One year in milliseconds.
pub const ONE_YEAR: i64 = 365 * 24 * 60 * 60 * 1_000;

/// An engine, its oracle and clock, and a minted asset.
pub struct TestFixture<S: Store + 'static = MemoryStore> {
    pub engine: Arc<AccessEngine<S, Arc<MemoryOracle>>>,
    pub oracle: Arc<MemoryOracle>,
    pub clock: Arc<ManualClock>,
    pub owner: Identity,
    pub grantee: Identity,
    pub asset: AssetRef,
}

impl TestFixture<MemoryStore> {
    /// Fixture over a fresh in-memory store with random identities.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Fixture with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(MemoryStore::new(), config, random_identity(), random_identity())
    }

    /// Fixture with identities derived from `seed`.
    pub fn with_seed(seed: u8) -> Self {
        Self::build(
            MemoryStore::new(),
            EngineConfig::default(),
            identity_from_seed(seed, 1),
            identity_from_seed(seed, 2),
        )
    }
}

impl<S: Store + 'static> TestFixture<S> {
    /// Fixture over `store`. The engine is subscribed to the oracle.
    pub fn build(store: S, config: EngineConfig, owner: Identity, grantee: Identity) -> Self {
        let oracle = Arc::new(MemoryOracle::new());
        let clock = Arc::new(ManualClock::new(FIXTURE_NOW));
        let asset = AssetRef::new(CollectionId::from_bytes([0xC0; 32]), 1);

        oracle
            .mint(asset, owner)
            .expect("fresh oracle accepts mint");

        let engine = Arc::new(
            AccessEngine::with_clock(store, oracle.clone(), clock.clone(), config)
                .expect("valid engine config"),
        );
        let listener: Arc<dyn TransferListener> = engine.clone();
        oracle.subscribe(&listener);

        Self {
            engine,
            oracle,
            clock,
            owner,
            grantee,
            asset,
        }
    }

    /// A one-year grant of `mask` to the fixture's grantee.
    pub fn grant(&self, mask: u64) -> GrantRequest {
        GrantRequest::new(
            self.grantee,
            PermissionMask::from(mask),
            FIXTURE_NOW + ONE_YEAR,
            "ipfs://fixture",
        )
    }

    /// Mint another token of the fixture's collection to the owner.
    pub fn mint_another(&self, token_id: u64) -> AssetRef {
        let asset = AssetRef::new(self.asset.collection, token_id);
        self.oracle
            .mint(asset, self.owner)
            .expect("token id not yet minted");
        asset
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// A random non-null identity.
pub fn random_identity() -> Identity {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes[0] |= 1;
    Identity::from_bytes(bytes)
}

/// A deterministic non-null identity.
pub fn identity_from_seed(seed: u8, index: u8) -> Identity {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    bytes[1] = index;
    bytes[31] = 1;
    Identity::from_bytes(bytes)
}

/// Distinct identities for multi-party tests.
pub fn multi_party_identities(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| identity_from_seed(0xAB, i as u8))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_is_wired() {
        let fixture = TestFixture::new();

        fixture
            .engine
            .set_permissions(fixture.owner, &fixture.asset, fixture.grant(816))
            .await
            .unwrap();
        assert!(fixture
            .engine
            .has_permission(&fixture.asset, &fixture.grantee, 4)
            .await
            .unwrap());

        fixture
            .oracle
            .transfer(&fixture.asset, random_identity())
            .await
            .unwrap();
        assert!(!fixture
            .engine
            .has_permission(&fixture.asset, &fixture.grantee, 4)
            .await
            .unwrap());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_identities(3);

        assert_ne!(parties[0], parties[1]);
        assert_ne!(parties[1], parties[2]);
        assert!(parties.iter().all(|p| !p.is_zero()));
    }

    #[test]
    fn test_seeded_fixture_is_deterministic() {
        let a = TestFixture::with_seed(7);
        let b = TestFixture::with_seed(7);
        assert_eq!(a.owner, b.owner);
        assert_eq!(a.grantee, b.grantee);
    }
}
