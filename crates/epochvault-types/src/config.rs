//! Ledger configuration. Fixed at engine construction, never mutated.

use serde::{Deserialize, Serialize};

use crate::{constants, Amount, CollaboratorId, EpochvaultError, Result};

/// Configuration for one settlement engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Identity the engine presents to the issuer when minting rewards.
    pub engine_id: CollaboratorId,
    /// Expected identity of the custody collaborator.
    pub custody_id: CollaboratorId,
    /// Expected identity of the issuance collaborator.
    pub issuer_id: CollaboratorId,
    /// Ticks per epoch. Must be positive.
    pub epoch_length: u64,
    /// Reward paid for epoch 0.
    pub start_amount: Amount,
    /// Per-epoch decrease of the reward.
    pub decrease_rate: Amount,
}

impl LedgerConfig {
    /// Config with fresh identities and the given curve parameters.
    #[must_use]
    pub fn new(epoch_length: u64, start_amount: Amount, decrease_rate: Amount) -> Self {
        Self {
            engine_id: CollaboratorId::new(),
            custody_id: CollaboratorId::new(),
            issuer_id: CollaboratorId::new(),
            epoch_length,
            start_amount,
            decrease_rate,
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.epoch_length == 0 {
            return Err(EpochvaultError::Configuration(
                "epoch_length must be positive".into(),
            ));
        }
        if self.engine_id == self.issuer_id || self.engine_id == self.custody_id {
            return Err(EpochvaultError::Configuration(
                "engine_id must differ from collaborator identities".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_EPOCH_LENGTH,
            constants::DEFAULT_START_AMOUNT,
            constants::DEFAULT_DECREASE_RATE,
        )
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl LedgerConfig {
    /// 300 ticks per epoch, 10 000 start, 100 decrease: reward hits zero at epoch 100.
    #[must_use]
    pub fn reference() -> Self {
        Self::new(300, 10_000, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_constants() {
        let cfg = LedgerConfig::default();
        assert_eq!(cfg.epoch_length, 300);
        assert_eq!(cfg.start_amount, 10_000);
        assert_eq!(cfg.decrease_rate, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_epoch_length_rejected() {
        let cfg = LedgerConfig::new(0, 10, 1);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, EpochvaultError::Configuration(_)));
    }

    #[test]
    fn engine_cannot_impersonate_issuer() {
        let mut cfg = LedgerConfig::reference();
        cfg.engine_id = cfg.issuer_id;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_roundtrip() {
        let cfg = LedgerConfig::reference();
        let json = cfg.to_json().unwrap();
        let back = LedgerConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn from_json_validates() {
        let mut cfg = LedgerConfig::reference();
        cfg.epoch_length = 0;
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(matches!(
            LedgerConfig::from_json(&json),
            Err(EpochvaultError::Configuration(_))
        ));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            LedgerConfig::from_json("{\"epoch_length\": 3}"),
            Err(EpochvaultError::Serialization(_))
        ));
    }
}
