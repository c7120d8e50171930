//! Lock records: one per asset held in custody.
//!
//! ## Lifecycle
//!
//! ```text
//!   ┌────────┐  deposit   ┌────────┐  withdraw   ┌────────┐
//!   │ ABSENT ├───────────▶│ LOCKED ├────────────▶│ ABSENT │
//!   └────────┘            └──┬──▲──┘             └────────┘
//!                            │  │ claim (checkpoint advances)
//!                            └──┘
//! ```
//!
//! `lock_epoch` never changes. `checkpoint_epoch` only moves forward and
//! never falls below `lock_epoch`.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_HOLDING_EPOCHS;
use crate::{AssetId, EpochId};

/// A deposited asset tracked for reward accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// The deposited asset.
    pub asset_id: AssetId,
    /// Epoch of deposit. Only used for the holding period.
    pub lock_epoch: EpochId,
    /// Reward is settled for every epoch before this one.
    pub checkpoint_epoch: EpochId,
}

impl LockRecord {
    /// A fresh lock: checkpoint starts at the deposit epoch.
    #[must_use]
    pub fn new(asset_id: AssetId, epoch: EpochId) -> Self {
        Self {
            asset_id,
            lock_epoch: epoch,
            checkpoint_epoch: epoch,
        }
    }

    /// Whether at least one epoch boundary separates `current` from the deposit.
    #[must_use]
    pub fn holding_period_elapsed(&self, current: EpochId) -> bool {
        current.0 >= self.lock_epoch.0.saturating_add(MIN_HOLDING_EPOCHS)
    }

    /// First epoch in which the lock may be withdrawn.
    #[must_use]
    pub fn withdrawable_from(&self) -> EpochId {
        EpochId(self.lock_epoch.0.saturating_add(MIN_HOLDING_EPOCHS))
    }

    /// Whether there are epochs before `current` not yet settled.
    #[must_use]
    pub fn has_unsettled(&self, current: EpochId) -> bool {
        self.checkpoint_epoch < current
    }
}
