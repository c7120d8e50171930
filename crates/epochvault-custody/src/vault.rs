//! In-memory custody vault for non-fungible assets.
//!
//! Each registered asset has exactly one [`Holder`]. `transfer_in` moves an
//! asset from its participant owner into the vault; `transfer_out` releases
//! it to a participant. Both are all-or-nothing: a rejected transfer leaves
//! the holder unchanged.

use std::collections::HashMap;

use epochvault_types::{AssetId, CollaboratorId, EpochvaultError, ParticipantId, Result};
use serde::{Deserialize, Serialize};

use crate::collaborator::{CustodyTransfer, Journaled};

/// Who currently holds an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    /// Held directly by a participant.
    Participant(ParticipantId),
    /// Held by the vault on behalf of the settlement engine.
    Vault,
}

impl std::fmt::Display for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Participant(p) => write!(f, "{p}"),
            Self::Vault => write!(f, "VAULT"),
        }
    }
}

/// Asset ownership table with an undo journal.
pub struct CustodyVault {
    id: CollaboratorId,
    holders: HashMap<AssetId, Holder>,
    /// `(asset, previous holder)` for every change since the last commit.
    journal: Vec<(AssetId, Option<Holder>)>,
}

impl CustodyVault {
    #[must_use]
    pub fn new(id: CollaboratorId) -> Self {
        Self {
            id,
            holders: HashMap::new(),
            journal: Vec::new(),
        }
    }

    /// Bring a new asset into existence, owned by `owner`.
    ///
    /// # Errors
    /// `CustodyRejected` if the asset already exists.
    pub fn register_asset(&mut self, owner: ParticipantId, asset_id: AssetId) -> Result<()> {
        if let Some(holder) = self.holders.get(&asset_id) {
            return Err(EpochvaultError::CustodyRejected {
                reason: format!("{asset_id} already exists (held by {holder})"),
            });
        }
        self.set_holder(asset_id, Holder::Participant(owner));
        Ok(())
    }

    #[must_use]
    pub fn holder_of(&self, asset_id: &AssetId) -> Option<Holder> {
        self.holders.get(asset_id).copied()
    }

    /// Number of assets currently held by the vault.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.holders
            .values()
            .filter(|h| matches!(h, Holder::Vault))
            .count()
    }

    fn set_holder(&mut self, asset_id: AssetId, holder: Holder) {
        let previous = self.holders.insert(asset_id, holder);
        self.journal.push((asset_id, previous));
    }
}

impl CustodyTransfer for CustodyVault {
    fn id(&self) -> CollaboratorId {
        self.id
    }

    fn transfer_in(&mut self, from: ParticipantId, asset_id: AssetId) -> Result<()> {
        match self.holders.get(&asset_id) {
            Some(Holder::Participant(owner)) if *owner == from => {}
            Some(holder) => {
                return Err(EpochvaultError::CustodyRejected {
                    reason: format!("{asset_id} is held by {holder}, not {from}"),
                });
            }
            None => {
                return Err(EpochvaultError::CustodyRejected {
                    reason: format!("{asset_id} does not exist"),
                });
            }
        }
        self.set_holder(asset_id, Holder::Vault);
        tracing::debug!(participant = %from, asset = %asset_id, "Asset taken into custody");
        Ok(())
    }

    fn transfer_out(&mut self, to: ParticipantId, asset_id: AssetId) -> Result<()> {
        match self.holders.get(&asset_id) {
            Some(Holder::Vault) => {}
            Some(holder) => {
                return Err(EpochvaultError::CustodyRejected {
                    reason: format!("{asset_id} is held by {holder}, not the vault"),
                });
            }
            None => {
                return Err(EpochvaultError::CustodyRejected {
                    reason: format!("{asset_id} does not exist"),
                });
            }
        }
        self.set_holder(asset_id, Holder::Participant(to));
        tracing::debug!(participant = %to, asset = %asset_id, "Asset released from custody");
        Ok(())
    }
}

impl Journaled for CustodyVault {
    type Savepoint = usize;

    fn savepoint(&self) -> usize {
        self.journal.len()
    }

    fn rollback_to(&mut self, savepoint: usize) {
        while self.journal.len() > savepoint {
            let Some((asset_id, previous)) = self.journal.pop() else {
                break;
            };
            match previous {
                Some(holder) => {
                    self.holders.insert(asset_id, holder);
                }
                None => {
                    self.holders.remove(&asset_id);
                }
            }
        }
    }

    fn commit(&mut self) {
        self.journal.clear();
    }
}
