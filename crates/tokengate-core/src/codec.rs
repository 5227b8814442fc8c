//! Permission codec: evaluation of packed permission masks.
//!
//! Everything here is pure bit arithmetic. The only failure mode is a slot
//! index outside the configured vocabulary.

use crate::error::{CoreError, Result};
use crate::mask::{PermissionMask, GRANTED_PAIR, MAX_SLOTS};

/// Evaluates masks against a vocabulary of `slots` capability slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionCodec {
    slots: u16,
}

impl PermissionCodec {
    /// A codec over `slots` capability slots (1..=128).
    pub fn new(slots: u16) -> Result<Self> {
        if slots == 0 || slots > MAX_SLOTS {
            return Err(CoreError::InvalidVocabulary(slots));
        }
        Ok(Self { slots })
    }

    /// Size of the vocabulary.
    pub fn slots(&self) -> u16 {
        self.slots
    }

    /// Reject slots outside the vocabulary.
    pub fn check_slot(&self, slot: u16) -> Result<()> {
        if slot >= self.slots {
            return Err(CoreError::SlotOutOfRange {
                slot,
                slots: self.slots,
            });
        }
        Ok(())
    }

    /// Whether both bits of `slot` are set in `mask`.
    pub fn has_permission(&self, mask: &PermissionMask, slot: u16) -> Result<bool> {
        self.check_slot(slot)?;
        Ok(mask.pair(slot) == Some(GRANTED_PAIR))
    }

    /// Whether every bit of `query` is also set in `mask`.
    pub fn has_permissions(&self, mask: &PermissionMask, query: &PermissionMask) -> bool {
        has_permissions(mask, query)
    }

    /// The bits `mask` and `query` share.
    pub fn intersect(&self, mask: &PermissionMask, query: &PermissionMask) -> PermissionMask {
        intersect(mask, query)
    }

    /// Build a mask granting the given slots, validating each one.
    pub fn mask_for(&self, slots: &[u16]) -> Result<PermissionMask> {
        for &slot in slots {
            self.check_slot(slot)?;
        }
        Ok(PermissionMask::from_slots(slots.iter().copied()))
    }
}

impl Default for PermissionCodec {
    fn default() -> Self {
        Self { slots: MAX_SLOTS }
    }
}

/// Single-slot check over the full mask width.
pub fn has_permission(mask: &PermissionMask, slot: u16) -> Result<bool> {
    PermissionCodec::default().has_permission(mask, slot)
}

/// `(mask & query) == query`.
pub fn has_permissions(mask: &PermissionMask, query: &PermissionMask) -> bool {
    (*mask & *query) == *query
}

/// `mask & query`.
pub fn intersect(mask: &PermissionMask, query: &PermissionMask) -> PermissionMask {
    *mask & *query
}
