//! # Tokengate Store
//!
//! Storage abstraction for Tokengate. Provides a trait-based interface for
//! the three persisted tables with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store abstracts persistence behind the [`Store`] trait so the
//! permission components stay storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for tests and embedded use.
//!
//! ## Tables
//!
//! - `registries`: `AssetRef -> RegistryHandle`
//! - `generations`: `RegistryHandle -> Generation`
//! - `grants`: `(RegistryHandle, grantee) -> GrantRecord`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tokengate_store::{SqliteStore, Store};
//! use tokengate_core::{AssetRef, CollectionId};
//!
//! async fn example() {
//!     let store = SqliteStore::open("grants.db").unwrap();
//!
//!     let asset = AssetRef::new(CollectionId::from_bytes([1; 32]), 7);
//!     let provisioned = store.create_or_get_registry(&asset).await.unwrap();
//!     assert!(provisioned.created);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent provisioning**: a second `create_or_get_registry` returns
//!   the existing handle with `created == false`
//! - **Atomic calls**: every trait method is one critical section (memory)
//!   or one transaction (SQLite)
//! - **No sweeping**: dead grants stay on disk until overwritten

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Bumped, GrantView, Provisioned, Store};
