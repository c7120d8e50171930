//! Decaying reward curve.
//!
//! ```text
//! reward_at(e) = max(0, start_amount - e * decrease_rate)
//! ```
//!
//! The curve is linear until it reaches zero at [`RewardCurve::zero_epoch`]
//! and flat afterwards. Range sums clip at that crossover so the closed form
//! stays exact; a plain arithmetic-series formula over the whole range would
//! count negative terms past the crossover.

use epochvault_types::{Amount, EpochId, EpochvaultError, Result};
use serde::{Deserialize, Serialize};

/// Linearly decreasing per-epoch reward, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCurve {
    start_amount: Amount,
    decrease_rate: Amount,
}

impl RewardCurve {
    #[must_use]
    pub fn new(start_amount: Amount, decrease_rate: Amount) -> Self {
        Self {
            start_amount,
            decrease_rate,
        }
    }

    #[must_use]
    pub fn start_amount(&self) -> Amount {
        self.start_amount
    }

    #[must_use]
    pub fn decrease_rate(&self) -> Amount {
        self.decrease_rate
    }

    /// Reward paid for one epoch. Saturates at zero, never wraps.
    #[must_use]
    pub fn reward_at(&self, epoch: EpochId) -> Amount {
        let decay = Amount::from(epoch.0).saturating_mul(self.decrease_rate);
        self.start_amount.saturating_sub(decay)
    }

    /// First epoch whose reward is zero, if any epoch in `u64` range is.
    #[must_use]
    pub fn zero_epoch(&self) -> Option<EpochId> {
        if self.start_amount == 0 {
            return Some(EpochId::GENESIS);
        }
        if self.decrease_rate == 0 {
            return None;
        }
        let first_zero = self.start_amount.div_ceil(self.decrease_rate);
        u64::try_from(first_zero).ok().map(EpochId)
    }

    /// Sum of `reward_at(i)` for `i` in `[start, end)`.
    ///
    /// # Errors
    /// - `InvalidRange` if `start > end`
    /// - `RewardOverflow` if the sum does not fit in 128 bits
    pub fn reward_range(&self, start: EpochId, end: EpochId) -> Result<Amount> {
        if start > end {
            return Err(EpochvaultError::InvalidRange { start, end });
        }

        // Everything from the crossover on contributes nothing.
        let stop = match self.zero_epoch() {
            Some(zero) => end.min(zero),
            None => end,
        };
        if start >= stop {
            return Ok(0);
        }

        let overflow = || EpochvaultError::RewardOverflow { start, end };
        let terms = Amount::from(stop.0 - start.0);
        let first = self.reward_at(start);
        let last = self.reward_at(EpochId(stop.0 - 1));

        // Every term in [start, stop) is positive, so this is an exact
        // arithmetic series. Split the halving to keep it integral.
        if terms % 2 == 0 {
            first
                .checked_add(last)
                .and_then(|pair| pair.checked_mul(terms / 2))
                .ok_or_else(overflow)
        } else {
            // Odd count: the sum is `terms` times the middle term.
            let middle = last + self.decrease_rate * ((terms - 1) / 2);
            middle.checked_mul(terms).ok_or_else(overflow)
        }
    }
}
