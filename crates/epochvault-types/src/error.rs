//! Error types for the epochvault ledger.
//!
//! All errors use the `EV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Identifier / registry errors
//! - 2xx: Epoch errors
//! - 3xx: Reward arithmetic errors
//! - 4xx: Collaborator errors (custody, issuance)
//! - 9xx: General / internal errors
//!
//! Every error aborts the triggering operation with no partial effect.

use thiserror::Error;

use crate::{AssetId, CollaboratorId, EpochId, ParticipantId};

/// Central error enum for all epochvault operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpochvaultError {
    // =================================================================
    // Identifier / Registry Errors (1xx)
    // =================================================================
    /// The asset identifier does not fit the compact 192-bit range.
    #[error("EV_ERR_100: Invalid asset identifier: {0} is outside the compact range")]
    InvalidIdentifier(AssetId),

    /// The participant holds no lock for this asset.
    #[error("EV_ERR_101: Lock not found: {asset_id} is not held by {participant}")]
    NotFound {
        participant: ParticipantId,
        asset_id: AssetId,
    },

    /// The participant already holds a lock for this asset.
    #[error("EV_ERR_102: Duplicate asset: {asset_id} already locked by {participant}")]
    DuplicateAsset {
        participant: ParticipantId,
        asset_id: AssetId,
    },

    /// A positional registry access fell outside the participant's collection.
    #[error("EV_ERR_103: Lock index {index} out of range (len {len})")]
    LockIndexOutOfRange { index: usize, len: usize },

    // =================================================================
    // Epoch Errors (2xx)
    // =================================================================
    /// Withdrawal attempted before one full epoch boundary was crossed.
    #[error("EV_ERR_200: Holding period not elapsed: locked in {lock_epoch}, now {current}")]
    HoldingPeriodNotElapsed { lock_epoch: EpochId, current: EpochId },

    /// Malformed epoch range query (start after end).
    #[error("EV_ERR_201: Invalid epoch range: [{start}, {end})")]
    InvalidRange { start: EpochId, end: EpochId },

    // =================================================================
    // Reward Arithmetic Errors (3xx)
    // =================================================================
    /// The reward sum over a range does not fit in 128 bits.
    #[error("EV_ERR_300: Reward overflow over [{start}, {end})")]
    RewardOverflow { start: EpochId, end: EpochId },

    // =================================================================
    // Collaborator Errors (4xx)
    // =================================================================
    /// The issuance collaborator does not recognise the engine as a minter.
    #[error("EV_ERR_400: Unauthorized minter: {minter}")]
    Unauthorized { minter: CollaboratorId },

    /// The custody collaborator refused a transfer.
    #[error("EV_ERR_401: Custody transfer rejected: {reason}")]
    CustodyRejected { reason: String },

    /// Issuer total supply no longer matches the sum of balances.
    #[error("EV_ERR_402: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("EV_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("EV_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid values, collaborator identity mismatch).
    #[error("EV_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EpochvaultError>;

impl From<serde_json::Error> for EpochvaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
