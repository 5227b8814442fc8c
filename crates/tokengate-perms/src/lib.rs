//! # Tokengate Permissions
//!
//! The stateful components of the engine: registry provisioning, ownership
//! generations, grant records, and grant evaluation.
//!
//! ## Overview
//!
//! Each governed asset gets a registry on first use. A registry holds one
//! grant record per grantee and belongs to the asset's current ownership
//! generation. Transferring the asset bumps the generation, which kills
//! every earlier record at once without touching it.
//!
//! ## Key Components
//!
//! - [`RegistryDirectory`]: idempotent `create_or_get` per asset
//! - [`VersionLedger`]: per-asset generation counter
//! - [`GrantStore`]: `(registry, grantee)` keyed records
//! - [`GrantState`]: live/dead evaluation of a record at an instant
//! - [`EventBus`]: broadcast of [`Notification`]s
//!
//! All components share one [`tokengate_store::Store`] and one bus.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokengate_perms::{EventBus, RegistryDirectory, VersionLedger};
//! use tokengate_store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let events = EventBus::default();
//! let directory = RegistryDirectory::new(store.clone(), events.clone());
//! let ledger = VersionLedger::new(store, events);
//! ```

pub mod directory;
pub mod error;
pub mod events;
pub mod grants;
pub mod ledger;
pub mod state;

pub use directory::RegistryDirectory;
pub use error::{PermsError, Result};
pub use events::{EventBus, Notification, DEFAULT_EVENT_CAPACITY};
pub use grants::GrantStore;
pub use ledger::VersionLedger;
pub use state::{GrantState, NoGrantReason};
