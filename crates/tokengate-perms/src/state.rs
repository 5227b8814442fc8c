//! Grant state evaluation.
//!
//! A stored record only counts if it was issued under the asset's current
//! generation and has not expired. Everything else reads as the zero mask.

use tokengate_core::{
    Generation, GrantRecord, PermissionCodec, PermissionMask, Result as CoreResult, Timestamp,
};
use tokengate_store::GrantView;

/// Why a grantee holds nothing on an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoGrantReason {
    /// The asset has no registry.
    Unprovisioned,

    /// The registry has no record for the grantee.
    Absent,

    /// The record predates the current ownership.
    StaleGeneration {
        granted: Generation,
        current: Generation,
    },

    /// The record's expiration has passed.
    Expired { expiration: Timestamp },
}

/// Effective grant of one grantee on one asset at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantState {
    /// Nothing is granted.
    NoGrant(NoGrantReason),

    /// A live record.
    Active(GrantRecord),
}

impl GrantState {
    /// Evaluate a snapshot at `now`.
    pub fn derive(view: GrantView, now: Timestamp) -> Self {
        if view.handle.is_none() {
            return GrantState::NoGrant(NoGrantReason::Unprovisioned);
        }

        let record = match view.record {
            Some(record) => record,
            None => return GrantState::NoGrant(NoGrantReason::Absent),
        };

        if record.is_live(view.generation, now) {
            GrantState::Active(record)
        } else if record.generation_at_grant != view.generation {
            GrantState::NoGrant(NoGrantReason::StaleGeneration {
                granted: record.generation_at_grant,
                current: view.generation,
            })
        } else {
            GrantState::NoGrant(NoGrantReason::Expired {
                expiration: record.expiration,
            })
        }
    }

    /// Whether a live record exists.
    pub fn is_active(&self) -> bool {
        matches!(self, GrantState::Active(_))
    }

    /// The live record, if any.
    pub fn record(&self) -> Option<&GrantRecord> {
        match self {
            GrantState::Active(record) => Some(record),
            GrantState::NoGrant(_) => None,
        }
    }

    /// Effective mask; zero when nothing is granted.
    pub fn mask(&self) -> PermissionMask {
        self.record().map(|r| r.mask).unwrap_or(PermissionMask::ZERO)
    }

    /// Whether `slot` is granted. The slot is range-checked even when
    /// nothing is granted.
    pub fn has_permission(&self, codec: &PermissionCodec, slot: u16) -> CoreResult<bool> {
        codec.has_permission(&self.mask(), slot)
    }

    /// Whether every bit of `query` is granted.
    ///
    /// Without a live record the zero mask only covers the zero query.
    pub fn has_permissions(&self, codec: &PermissionCodec, query: &PermissionMask) -> bool {
        codec.has_permissions(&self.mask(), query)
    }

    /// The granted subset of `query`.
    pub fn get_permissions(&self, codec: &PermissionCodec, query: &PermissionMask) -> PermissionMask {
        codec.intersect(&self.mask(), query)
    }
}
