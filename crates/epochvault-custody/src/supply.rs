//! Supply conservation invariant checker for reward issuance.
//!
//! Invariant enforced by [`crate::RewardIssuer::verify_supply`]:
//! ```text
//! Σ(balances) == total_supply == Σ(issued) - Σ(reverted)
//! ```
//!
//! `reverted` counts issuance undone by a rolled-back engine operation.

use epochvault_types::{Amount, EpochvaultError, Result};
use serde::{Deserialize, Serialize};

/// Tracks cumulative issuance and reversals independently of balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyConservation {
    /// Total issued since genesis, including later-reverted issuance.
    issued: Amount,
    /// Total issuance undone by rollbacks.
    reverted: Amount,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_issue(&mut self, amount: Amount) {
        self.issued = self.issued.saturating_add(amount);
    }

    pub fn record_revert(&mut self, amount: Amount) {
        self.reverted = self.reverted.saturating_add(amount);
    }

    /// Expected outstanding supply: issued - reverted.
    #[must_use]
    pub fn expected_supply(&self) -> Amount {
        self.issued.saturating_sub(self.reverted)
    }

    #[must_use]
    pub fn total_issued(&self) -> Amount {
        self.issued
    }

    #[must_use]
    pub fn total_reverted(&self) -> Amount {
        self.reverted
    }

    /// Verify that `actual_supply` matches the expected outstanding supply.
    ///
    /// # Errors
    /// Returns [`EpochvaultError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_supply: Amount) -> Result<()> {
        let expected = self.expected_supply();
        if actual_supply != expected {
            return Err(EpochvaultError::SupplyInvariantViolation {
                reason: format!(
                    "actual supply {actual_supply} != expected {expected} \
                     (issued={}, reverted={})",
                    self.issued, self.reverted,
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_supply(), 0);
        assert!(sc.verify(0).is_ok());
    }

    #[test]
    fn issues_accumulate() {
        let mut sc = SupplyConservation::new();
        sc.record_issue(1_000);
        sc.record_issue(500);
        assert_eq!(sc.expected_supply(), 1_500);
        assert_eq!(sc.total_issued(), 1_500);
    }

    #[test]
    fn reverts_reduce_expected() {
        let mut sc = SupplyConservation::new();
        sc.record_issue(1_000);
        sc.record_revert(300);
        assert_eq!(sc.expected_supply(), 700);
        assert_eq!(sc.total_reverted(), 300);
        assert!(sc.verify(700).is_ok());
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        sc.record_issue(10);
        let err = sc.verify(11).unwrap_err();
        assert!(matches!(
            err,
            EpochvaultError::SupplyInvariantViolation { .. }
        ));
    }
}
