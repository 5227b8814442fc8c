//! Strong type definitions for Tokengate.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Unix timestamp in milliseconds.
pub type Timestamp = i64;

macro_rules! byte_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// The all-zero value (the null sentinel).
            pub const ZERO: Self = Self([0u8; 32]);

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Whether this is the all-zero sentinel.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let bytes = hex::decode(s)?;
                if bytes.len() != 32 {
                    return Err(hex::FromHexError::InvalidStringLength);
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), &self.to_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let arr: [u8; 32] = slice.try_into()?;
                Ok(Self(arr))
            }
        }
    };
}

byte_id!(
    /// An opaque account identity (owner, caller, or grantee).
    ///
    /// The engine only compares identities; it never interprets the bytes.
    /// [`Identity::ZERO`] is the null identity and can never receive a grant.
    Identity,
    "Identity"
);

byte_id!(
    /// Identifier of the external collection a token belongs to.
    CollectionId,
    "Collection"
);

/// Reference to a governed asset: one token of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef {
    /// The collection the token belongs to.
    pub collection: CollectionId,
    /// The token within the collection.
    pub token_id: u64,
}

impl AssetRef {
    /// Create a new asset reference.
    pub const fn new(collection: CollectionId, token_id: u64) -> Self {
        Self {
            collection,
            token_id,
        }
    }

    /// A reference is well formed when neither part is zero.
    pub fn is_well_formed(&self) -> bool {
        !self.collection.is_zero() && self.token_id != 0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", &self.collection.to_hex()[..16], self.token_id)
    }
}

/// Handle of a provisioned per-asset registry.
///
/// Handles are allocated sequentially starting at 1 and double as an index
/// into the grant arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryHandle(pub u64);

impl RegistryHandle {
    /// Get the raw handle value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registry#{}", self.0)
    }
}

/// Per-asset ownership generation.
///
/// Starts at [`Generation::INITIAL`] and advances by exactly one on every
/// confirmed ownership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    /// Generation of an asset that has never changed hands.
    pub const INITIAL: Self = Self(1);

    /// Get the raw counter value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The next generation.
    pub fn next(self) -> Result<Self, CoreError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(CoreError::GenerationOverflow)
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_hex_roundtrip() {
        let id = Identity::from_bytes([0x42; 32]);
        let recovered = Identity::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_identity_from_short_hex_rejected() {
        assert!(Identity::from_hex("abcd").is_err());
    }

    #[test]
    fn test_identity_debug() {
        let id = Identity::from_bytes([0xcd; 32]);
        assert_eq!(format!("{:?}", id), "Identity(cdcdcdcdcdcdcdcd)");
    }

    #[test]
    fn test_asset_ref_well_formed() {
        let collection = CollectionId::from_bytes([1; 32]);

        assert!(AssetRef::new(collection, 1).is_well_formed());
        assert!(!AssetRef::new(collection, 0).is_well_formed());
        assert!(!AssetRef::new(CollectionId::ZERO, 1).is_well_formed());
    }

    #[test]
    fn test_generation_next() {
        assert_eq!(Generation::default(), Generation::INITIAL);
        assert_eq!(Generation::INITIAL.next().unwrap(), Generation(2));
        assert!(matches!(
            Generation(u64::MAX).next(),
            Err(CoreError::GenerationOverflow)
        ));
    }
}
