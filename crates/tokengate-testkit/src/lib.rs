//! # Tokengate Testkit
//!
//! Testing utilities for Tokengate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Vectors**: Stored masks with expected query results
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A wired engine, oracle, and clock with a minted asset
//!
//! ## Vectors
//!
//! ```rust
//! use tokengate_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok) in verify_all_vectors() {
//!     assert!(ok, "{name}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tokengate_testkit::generators::{GrantParams, record_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn record_roundtrips(params: GrantParams) {
//!         let record = record_from_params(&params);
//!         let bytes = record.to_bytes().unwrap();
//!         prop_assert_eq!(tokengate_core::GrantRecord::from_bytes(&bytes).unwrap(), record);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use tokengate_testkit::fixtures::TestFixture;
//!
//! # async fn example() {
//! let fixture = TestFixture::new();
//! fixture
//!     .engine
//!     .set_permissions(fixture.owner, &fixture.asset, fixture.grant(816))
//!     .await
//!     .unwrap();
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    identity_from_seed, multi_party_identities, random_identity, TestFixture, FIXTURE_NOW,
    ONE_YEAR,
};
