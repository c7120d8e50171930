//! In-memory reward issuer.
//!
//! Tracks per-participant reward balances and total supply. Only identities
//! in the minter set may issue; every issue is journaled so a failed engine
//! operation can revert it.

use std::collections::{HashMap, HashSet};

use epochvault_types::{Amount, CollaboratorId, EpochvaultError, ParticipantId, Result};

use crate::collaborator::{Issuance, Journaled};
use crate::supply::SupplyConservation;

/// Fungible reward ledger with minter authorization.
pub struct RewardIssuer {
    id: CollaboratorId,
    /// Identities allowed to call [`Issuance::issue`].
    minters: HashSet<CollaboratorId>,
    balances: HashMap<ParticipantId, Amount>,
    total_supply: Amount,
    supply: SupplyConservation,
    /// Issues since the last commit, oldest first.
    journal: Vec<(ParticipantId, Amount)>,
}

impl RewardIssuer {
    #[must_use]
    pub fn new(id: CollaboratorId) -> Self {
        Self {
            id,
            minters: HashSet::new(),
            balances: HashMap::new(),
            total_supply: 0,
            supply: SupplyConservation::new(),
            journal: Vec::new(),
        }
    }

    /// Grant mint authority.
    pub fn authorize_minter(&mut self, minter: CollaboratorId) {
        self.minters.insert(minter);
    }

    /// Withdraw mint authority. Returns whether it was held.
    pub fn revoke_minter(&mut self, minter: CollaboratorId) -> bool {
        self.minters.remove(&minter)
    }

    #[must_use]
    pub fn is_minter(&self, minter: CollaboratorId) -> bool {
        self.minters.contains(&minter)
    }

    #[must_use]
    pub fn balance_of(&self, participant: ParticipantId) -> Amount {
        self.balances.get(&participant).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }

    /// Check `Σ balances == total_supply == issued - reverted`.
    pub fn verify_supply(&self) -> Result<()> {
        let summed = self
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
            .ok_or_else(|| EpochvaultError::SupplyInvariantViolation {
                reason: "sum of balances overflows".into(),
            })?;
        if summed != self.total_supply {
            return Err(EpochvaultError::SupplyInvariantViolation {
                reason: format!(
                    "balances sum {summed} != total supply {}",
                    self.total_supply
                ),
            });
        }
        self.supply.verify(self.total_supply)
    }
}

impl Issuance for RewardIssuer {
    fn id(&self) -> CollaboratorId {
        self.id
    }

    fn issue(&mut self, minter: CollaboratorId, to: ParticipantId, amount: Amount) -> Result<()> {
        if !self.minters.contains(&minter) {
            return Err(EpochvaultError::Unauthorized { minter });
        }
        let new_supply = self.total_supply.checked_add(amount).ok_or_else(|| {
            EpochvaultError::SupplyInvariantViolation {
                reason: format!("issuing {amount} overflows total supply {}", self.total_supply),
            }
        })?;

        // Every balance is bounded by the total supply, so this cannot overflow.
        *self.balances.entry(to).or_insert(0) += amount;
        self.total_supply = new_supply;
        self.supply.record_issue(amount);
        self.journal.push((to, amount));

        tracing::debug!(
            participant = %to,
            amount,
            total_supply = self.total_supply,
            "Reward issued"
        );
        Ok(())
    }
}

impl Journaled for RewardIssuer {
    type Savepoint = usize;

    fn savepoint(&self) -> usize {
        self.journal.len()
    }

    fn rollback_to(&mut self, savepoint: usize) {
        while self.journal.len() > savepoint {
            let Some((to, amount)) = self.journal.pop() else {
                break;
            };
            if let Some(balance) = self.balances.get_mut(&to) {
                *balance -= amount;
            }
            self.total_supply -= amount;
            self.supply.record_revert(amount);
            tracing::warn!(participant = %to, amount, "Reward issuance reverted");
        }
    }

    fn commit(&mut self) {
        self.journal.clear();
    }
}
