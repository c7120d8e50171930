//! Identifiers and scalar aliases used throughout epochvault.
//!
//! Participant and collaborator identities use UUIDv7. Asset identifiers are
//! 256-bit big-endian values, of which only the compact range below 2^192 is
//! accepted into custody.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::COMPACT_ID_BITS;
use crate::{EpochvaultError, Result};

/// Value of the host-supplied monotonic counter.
pub type Tick = u64;

/// Fungible reward amount.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Identity of a participant that deposits assets and receives rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CollaboratorId
// ---------------------------------------------------------------------------

/// Identity of an external collaborator (custody, issuer) or of the engine
/// itself when it presents as a minter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CollaboratorId(pub Uuid);

impl CollaboratorId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CollaboratorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CollaboratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collab:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Identifier of a deposited non-fungible asset, stored big-endian.
///
/// Ordering follows the numeric value. Only identifiers strictly below
/// 2^192 are compact; see [`AssetId::ensure_compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub [u8; 32]);

/// Number of leading big-endian bytes that must be zero for a compact id.
const COMPACT_PREFIX_BYTES: usize = 32 - (COMPACT_ID_BITS as usize / 8);

impl AssetId {
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// The first non-compact identifier, 2^192.
    #[must_use]
    pub fn compact_bound() -> Self {
        let mut bytes = [0u8; 32];
        bytes[COMPACT_PREFIX_BYTES - 1] = 1;
        Self(bytes)
    }

    /// The largest compact identifier, 2^192 - 1.
    #[must_use]
    pub fn max_compact() -> Self {
        let mut bytes = [0xffu8; 32];
        bytes[..COMPACT_PREFIX_BYTES].fill(0);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this identifier is strictly below 2^192.
    #[must_use]
    pub fn is_compact(&self) -> bool {
        self.0[..COMPACT_PREFIX_BYTES].iter().all(|b| *b == 0)
    }

    /// Returns the id unchanged if compact, else [`EpochvaultError::InvalidIdentifier`].
    pub fn ensure_compact(self) -> Result<Self> {
        if self.is_compact() {
            Ok(self)
        } else {
            Err(EpochvaultError::InvalidIdentifier(self))
        }
    }

    /// Hex of the significant bytes (no leading zero bytes).
    #[must_use]
    pub fn short(&self) -> String {
        let first = self.0.iter().position(|b| *b != 0).unwrap_or(31);
        hex::encode(&self.0[first..])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:0x{}", self.short())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl AssetId {
    /// Random compact identifier.
    #[must_use]
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes[COMPACT_PREFIX_BYTES..]);
        Self(bytes)
    }
}

// ---------------------------------------------------------------------------
// EpochId
// ---------------------------------------------------------------------------

/// Discrete time bucket derived from the tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EpochId(pub u64);

impl EpochId {
    pub const GENESIS: Self = Self(0);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_id_uniqueness() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn compact_bound_is_two_pow_192() {
        let bound = AssetId::compact_bound();
        assert_eq!(bound.short(), format!("01{}", "00".repeat(24)));
        assert!(!bound.is_compact());
    }

    #[test]
    fn max_compact_is_just_below_bound() {
        let max = AssetId::max_compact();
        assert!(max.is_compact());
        assert!(max < AssetId::compact_bound());
        assert_eq!(max.short(), "ff".repeat(24));
    }

    #[test]
    fn ensure_compact_rejects_bound() {
        let err = AssetId::compact_bound().ensure_compact().unwrap_err();
        assert!(matches!(err, EpochvaultError::InvalidIdentifier(_)));
        assert!(AssetId::max_compact().ensure_compact().is_ok());
    }

    #[test]
    fn from_u128_is_always_compact() {
        assert!(AssetId::from_u128(0).is_compact());
        assert!(AssetId::from_u128(u128::MAX).is_compact());
    }

    #[test]
    fn asset_id_ordering_is_numeric() {
        assert!(AssetId::from_u128(2) < AssetId::from_u128(256));
        assert!(AssetId::from_u128(u128::MAX) < AssetId::max_compact());
    }

    #[test]
    fn asset_id_display() {
        assert_eq!(format!("{}", AssetId::from_u128(0)), "asset:0x00");
        assert_eq!(format!("{}", AssetId::from_u128(0x1234)), "asset:0x1234");
    }

    #[test]
    fn random_asset_ids_are_compact() {
        for _ in 0..16 {
            assert!(AssetId::random().is_compact());
        }
    }

    #[test]
    fn epoch_id_next_saturates() {
        assert_eq!(EpochId(5).next(), EpochId(6));
        assert_eq!(EpochId(u64::MAX).next(), EpochId(u64::MAX));
    }

    #[test]
    fn serde_roundtrips() {
        let asset = AssetId::max_compact();
        let json = serde_json::to_string(&asset).unwrap();
        let back: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, back);

        let pid = ParticipantId::new();
        let json = serde_json::to_string(&pid).unwrap();
        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(pid, back);
    }
}
