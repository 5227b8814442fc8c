//! The 256-bit permission mask.
//!
//! Capabilities are packed two bits per slot: slot `i` lives at bits
//! `[2i, 2i + 1]`. A slot is granted only when both bits are set; `01` and
//! `10` are representable but never count as granted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Width of a mask in bits.
pub const MASK_BITS: u32 = 256;

/// Number of 2-bit slots a mask can hold.
pub const MAX_SLOTS: u16 = (MASK_BITS / 2) as u16;

/// Value of a fully granted slot pair.
pub const GRANTED_PAIR: u8 = 0b11;

const LIMBS: usize = 4;

/// A fixed-width 256-bit permission bitmask.
///
/// Stored as four little-endian `u64` limbs (limb 0 holds bits 0..64).
/// Slot pairs start at even bit offsets, so a pair never straddles limbs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionMask([u64; LIMBS]);

impl PermissionMask {
    /// The empty mask.
    pub const ZERO: Self = Self([0; LIMBS]);

    /// Every bit set.
    pub const ALL: Self = Self([u64::MAX; LIMBS]);

    /// Create from little-endian limbs.
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    /// Get the little-endian limbs.
    pub const fn limbs(&self) -> [u64; 4] {
        self.0
    }

    /// Whether no bit is set.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; LIMBS]
    }

    /// Raw two-bit value of a slot, or `None` past the mask width.
    pub fn pair(&self, slot: u16) -> Option<u8> {
        if slot >= MAX_SLOTS {
            return None;
        }
        let bit = 2 * slot as u32;
        let limb = self.0[(bit / 64) as usize];
        Some(((limb >> (bit % 64)) & 0b11) as u8)
    }

    /// Set both bits of a slot. Slots past the mask width are ignored.
    pub fn with_slot(mut self, slot: u16) -> Self {
        if slot < MAX_SLOTS {
            let bit = 2 * slot as u32;
            self.0[(bit / 64) as usize] |= 0b11u64 << (bit % 64);
        }
        self
    }

    /// Build a mask granting every listed slot.
    pub fn from_slots(slots: impl IntoIterator<Item = u16>) -> Self {
        slots
            .into_iter()
            .fold(Self::ZERO, |mask, slot| mask.with_slot(slot))
    }

    /// Slots whose pair is fully granted, in ascending order.
    pub fn granted_slots(&self) -> Vec<u16> {
        (0..MAX_SLOTS)
            .filter(|&slot| self.pair(slot) == Some(GRANTED_PAIR))
            .collect()
    }

    /// Low 128 bits, if the high half is empty.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[2] != 0 || self.0[3] != 0 {
            return None;
        }
        Some((self.0[1] as u128) << 64 | self.0[0] as u128)
    }

    /// Big-endian byte encoding.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.0.iter().rev().enumerate() {
            out[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_be_bytes());
        }
        out
    }

    /// Decode from big-endian bytes.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; LIMBS];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            limbs[LIMBS - 1 - i] = u64::from_be_bytes(word);
        }
        Self(limbs)
    }

    /// 64-character big-endian hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Parse a big-endian hex string of up to 64 digits, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() > 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(padded, &mut bytes)?;
        Ok(Self::from_be_bytes(bytes))
    }
}

impl From<u128> for PermissionMask {
    fn from(value: u128) -> Self {
        Self([value as u64, (value >> 64) as u64, 0, 0])
    }
}

impl From<u64> for PermissionMask {
    fn from(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }
}

impl BitAnd for PermissionMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        let mut out = [0u64; LIMBS];
        for (i, limb) in out.iter_mut().enumerate() {
            *limb = self.0[i] & rhs.0[i];
        }
        Self(out)
    }
}

impl BitOr for PermissionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        let mut out = [0u64; LIMBS];
        for (i, limb) in out.iter_mut().enumerate() {
            *limb = self.0[i] | rhs.0[i];
        }
        Self(out)
    }
}

impl fmt::Debug for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionMask({})", self)
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            write!(f, "0x0")
        } else {
            write!(f, "0x{}", trimmed)
        }
    }
}

// Masks serialize as hex so audit exports stay readable.
impl Serialize for PermissionMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PermissionMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_reads_both_bits() {
        // 816 = 0b11_0011_0000: slots 2 and 4 granted
        let mask = PermissionMask::from(816u64);

        assert_eq!(mask.pair(0), Some(0b00));
        assert_eq!(mask.pair(2), Some(0b11));
        assert_eq!(mask.pair(4), Some(0b11));
        assert_eq!(mask.pair(128), None);
    }

    #[test]
    fn test_from_slots() {
        let mask = PermissionMask::from_slots([2, 4]);
        assert_eq!(mask, PermissionMask::from(816u64));
        assert_eq!(mask.granted_slots(), vec![2, 4]);
    }

    #[test]
    fn test_partial_pair_not_listed() {
        // slot 0 = 01, slot 1 = 10
        let mask = PermissionMask::from(0b1001u64);
        assert!(mask.granted_slots().is_empty());
    }

    #[test]
    fn test_high_slots_cross_limbs() {
        let mask = PermissionMask::from_slots([31, 32, 127]);

        assert_eq!(mask.pair(31), Some(0b11));
        assert_eq!(mask.pair(32), Some(0b11));
        assert_eq!(mask.pair(127), Some(0b11));
        assert_eq!(mask.limbs()[0], 0b11u64 << 62);
        assert_eq!(mask.limbs()[1], 0b11u64);
        assert_eq!(mask.limbs()[3], 0b11u64 << 62);
        assert_eq!(mask.to_u128(), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        let mask = PermissionMask::from_slots([0, 63, 100]);
        assert_eq!(PermissionMask::from_hex(&mask.to_hex()).unwrap(), mask);
        assert_eq!(
            PermissionMask::from_hex("0x330").unwrap(),
            PermissionMask::from(816u64)
        );
    }

    #[test]
    fn test_be_bytes_layout() {
        let bytes = PermissionMask::from(816u64).to_be_bytes();
        assert_eq!(&bytes[30..], &[0x03, 0x30]);
        assert!(bytes[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(PermissionMask::ZERO.to_string(), "0x0");
        assert_eq!(PermissionMask::from(816u64).to_string(), "0x330");
    }

    #[test]
    fn test_serde_json_hex() {
        let mask = PermissionMask::from(816u64);
        let json = serde_json::to_string(&mask).unwrap();
        assert!(json.ends_with("330\""));
        let back: PermissionMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mask);
    }
}
