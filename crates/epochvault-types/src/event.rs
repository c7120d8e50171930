//! Ledger events and their hash-chained audit records.
//!
//! Every committed participant-facing operation produces one or more
//! [`LedgerEvent`]s. The settlement crate wraps each in an [`EventRecord`]
//! whose digest commits to the previous record, forming an append-only chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::EVENT_DIGEST_DOMAIN;
use crate::{Amount, AssetId, EpochId, ParticipantId, Result};

/// Something observable that happened to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// An asset entered custody and a lock was created.
    Deposited {
        participant: ParticipantId,
        asset_id: AssetId,
        epoch: EpochId,
    },
    /// Reward was settled and issued (possibly zero).
    Claimed {
        participant: ParticipantId,
        amount: Amount,
        epoch: EpochId,
    },
    /// An asset left custody and its lock was removed.
    Withdrawn {
        participant: ParticipantId,
        asset_id: AssetId,
        epoch: EpochId,
    },
}

impl LedgerEvent {
    /// The participant the event concerns.
    #[must_use]
    pub fn participant(&self) -> ParticipantId {
        match self {
            Self::Deposited { participant, .. }
            | Self::Claimed { participant, .. }
            | Self::Withdrawn { participant, .. } => *participant,
        }
    }

    /// The epoch in which the event happened.
    #[must_use]
    pub fn epoch(&self) -> EpochId {
        match self {
            Self::Deposited { epoch, .. }
            | Self::Claimed { epoch, .. }
            | Self::Withdrawn { epoch, .. } => *epoch,
        }
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposited { .. } => write!(f, "DEPOSITED"),
            Self::Claimed { .. } => write!(f, "CLAIMED"),
            Self::Withdrawn { .. } => write!(f, "WITHDRAWN"),
        }
    }
}

/// A committed event with its position and chain digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// The event itself.
    pub event: LedgerEvent,
    /// Wall-clock time the record was appended. Not part of the digest.
    pub recorded_at: DateTime<Utc>,
    /// `SHA-256(domain || prev_digest || sequence || json(event))`.
    pub digest: [u8; 32],
}

impl EventRecord {
    /// Compute the chain digest for an event at `sequence` following `prev`.
    pub fn compute_digest(prev: &[u8; 32], sequence: u64, event: &LedgerEvent) -> Result<[u8; 32]> {
        let payload = serde_json::to_vec(event)?;
        let mut hasher = Sha256::new();
        hasher.update(EVENT_DIGEST_DOMAIN);
        hasher.update(prev);
        hasher.update(sequence.to_le_bytes());
        hasher.update(&payload);
        Ok(hasher.finalize().into())
    }

    /// Hex form of the digest, for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}
