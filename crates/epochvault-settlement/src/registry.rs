//! Per-participant lock registry.
//!
//! Each participant owns an insertion-ordered `Vec<LockRecord>`. Lookup by
//! asset is a linear scan; a single participant is expected to hold few
//! locks. Removal is swap-with-last-then-pop, so it is O(1) but reorders the
//! collection.
//!
//! **Index invalidation:** any removal in a participant's collection may move
//! the last record into the removed slot. Indices obtained before a removal
//! must not be reused after it; look the asset up again instead.

use std::collections::HashMap;

use epochvault_types::{AssetId, EpochId, EpochvaultError, LockRecord, ParticipantId, Result};

/// Mapping from participant to their active locks.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    /// Participants with no locks have no entry.
    locks: HashMap<ParticipantId, Vec<LockRecord>>,
}

impl LockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lock with `lock_epoch = checkpoint_epoch = epoch`. Returns its index.
    ///
    /// # Errors
    /// `DuplicateAsset` if the participant already holds `asset_id`.
    pub fn append(
        &mut self,
        participant: ParticipantId,
        asset_id: AssetId,
        epoch: EpochId,
    ) -> Result<usize> {
        if self.contains(participant, asset_id) {
            return Err(EpochvaultError::DuplicateAsset {
                participant,
                asset_id,
            });
        }
        let locks = self.locks.entry(participant).or_default();
        locks.push(LockRecord::new(asset_id, epoch));
        Ok(locks.len() - 1)
    }

    #[must_use]
    pub fn contains(&self, participant: ParticipantId, asset_id: AssetId) -> bool {
        self.locks_of(participant)
            .iter()
            .any(|lock| lock.asset_id == asset_id)
    }

    /// Position of `asset_id` in the participant's collection.
    ///
    /// # Errors
    /// `NotFound` if the participant holds no lock for `asset_id`.
    pub fn find_index(&self, participant: ParticipantId, asset_id: AssetId) -> Result<usize> {
        self.locks_of(participant)
            .iter()
            .position(|lock| lock.asset_id == asset_id)
            .ok_or(EpochvaultError::NotFound {
                participant,
                asset_id,
            })
    }

    pub fn get(&self, participant: ParticipantId, index: usize) -> Result<&LockRecord> {
        let locks = self.locks_of(participant);
        locks.get(index).ok_or(EpochvaultError::LockIndexOutOfRange {
            index,
            len: locks.len(),
        })
    }

    pub fn get_mut(&mut self, participant: ParticipantId, index: usize) -> Result<&mut LockRecord> {
        let locks = self.locks.get_mut(&participant);
        let len = locks.as_ref().map_or(0, |l| l.len());
        locks
            .and_then(|l| l.get_mut(index))
            .ok_or(EpochvaultError::LockIndexOutOfRange { index, len })
    }

    /// Remove the lock at `index` by moving the last lock into its slot.
    ///
    /// Invalidates any index held for the previously-last lock.
    pub fn remove_at(&mut self, participant: ParticipantId, index: usize) -> Result<LockRecord> {
        let Some(locks) = self.locks.get_mut(&participant) else {
            return Err(EpochvaultError::LockIndexOutOfRange { index, len: 0 });
        };
        if index >= locks.len() {
            return Err(EpochvaultError::LockIndexOutOfRange {
                index,
                len: locks.len(),
            });
        }
        let removed = locks.swap_remove(index);
        if locks.is_empty() {
            self.locks.remove(&participant);
        }
        Ok(removed)
    }

    /// Locks in registry order. Empty if the participant holds none.
    #[must_use]
    pub fn locks_of(&self, participant: ParticipantId) -> &[LockRecord] {
        self.locks
            .get(&participant)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn lock_count(&self, participant: ParticipantId) -> usize {
        self.locks_of(participant).len()
    }

    /// Number of participants holding at least one lock.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn total_locks(&self) -> usize {
        self.locks.values().map(Vec::len).sum()
    }

    /// Iterate over `(participant, locks)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &[LockRecord])> {
        self.locks.iter().map(|(p, locks)| (p, locks.as_slice()))
    }

    /// Copy of one participant's collection, for [`Self::restore`].
    #[must_use]
    pub fn snapshot(&self, participant: ParticipantId) -> Vec<LockRecord> {
        self.locks_of(participant).to_vec()
    }

    /// Replace one participant's collection wholesale.
    pub fn restore(&mut self, participant: ParticipantId, locks: Vec<LockRecord>) {
        if locks.is_empty() {
            self.locks.remove(&participant);
        } else {
            self.locks.insert(participant, locks);
        }
    }
}
