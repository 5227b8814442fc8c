//! Grant records.
//!
//! A record is the whole grant of one grantee on one asset. Writes always
//! replace the full record; there is no partial update.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::mask::PermissionMask;
use crate::types::{Generation, Identity, Timestamp};

/// A grantee's stored capability set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Who holds the grant.
    pub grantee: Identity,

    /// Granted capability slots.
    pub mask: PermissionMask,

    /// Expiry (Unix milliseconds, exclusive).
    pub expiration: Timestamp,

    /// Opaque provenance tag supplied by the grantor.
    pub source: String,

    /// Ownership generation the grant was issued under.
    pub generation_at_grant: Generation,
}

impl GrantRecord {
    /// Whether the record is live at `now` under `current` generation.
    pub fn is_live(&self, current: Generation, now: Timestamp) -> bool {
        self.generation_at_grant == current && now < self.expiration
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}
