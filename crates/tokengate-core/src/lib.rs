//! # Tokengate Core
//!
//! Pure primitives for Tokengate: asset references, identities, packed
//! permission masks, and grant records.
//!
//! This crate contains no I/O, no storage, no locking. It is pure
//! computation over plain data.
//!
//! ## Key Types
//!
//! - [`AssetRef`] - A governed asset: `(collection, token_id)`
//! - [`Identity`] - Opaque comparable account identity
//! - [`PermissionMask`] - 256-bit mask, two bits per capability slot
//! - [`PermissionCodec`] - Slot and mask evaluation
//! - [`GrantRecord`] - One grantee's stored grant
//!
//! ## Encoding
//!
//! Slot `i` occupies bits `[2i, 2i + 1]` and is granted only when both bits
//! are set. See the [`mask`] module.

pub mod codec;
pub mod error;
pub mod mask;
pub mod record;
pub mod types;
pub mod validation;

pub use codec::{has_permission, has_permissions, intersect, PermissionCodec};
pub use error::{CoreError, Result, ValidationError};
pub use mask::{PermissionMask, GRANTED_PAIR, MASK_BITS, MAX_SLOTS};
pub use record::GrantRecord;
pub use types::{AssetRef, CollectionId, Generation, Identity, RegistryHandle, Timestamp};
pub use validation::{validate_asset_ref, validate_grantee};
