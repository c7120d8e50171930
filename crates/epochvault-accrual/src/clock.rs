//! Epoch clock: tick → epoch.

use epochvault_types::{EpochId, EpochvaultError, Result, Tick};
use serde::{Deserialize, Serialize};

/// Maps host ticks to epochs of fixed length, counted from `anchor_tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    anchor_tick: Tick,
    epoch_length: u64,
}

impl EpochClock {
    /// # Errors
    /// `Configuration` if `epoch_length` is zero.
    pub fn new(anchor_tick: Tick, epoch_length: u64) -> Result<Self> {
        if epoch_length == 0 {
            return Err(EpochvaultError::Configuration(
                "epoch_length must be positive".into(),
            ));
        }
        Ok(Self {
            anchor_tick,
            epoch_length,
        })
    }

    #[must_use]
    pub fn anchor_tick(&self) -> Tick {
        self.anchor_tick
    }

    #[must_use]
    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    /// Epoch containing `tick`. Ticks before the anchor clamp to epoch 0.
    #[must_use]
    pub fn epoch_at(&self, tick: Tick) -> EpochId {
        match tick.checked_sub(self.anchor_tick) {
            Some(elapsed) => EpochId(elapsed / self.epoch_length),
            None => EpochId::GENESIS,
        }
    }

    /// First tick of `epoch`, saturating at `Tick::MAX`.
    #[must_use]
    pub fn epoch_start_tick(&self, epoch: EpochId) -> Tick {
        epoch
            .0
            .saturating_mul(self.epoch_length)
            .saturating_add(self.anchor_tick)
    }
}
