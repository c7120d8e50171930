//! Trait interfaces between the settlement engine and its collaborators.
//!
//! These traits define the contracts the engine relies on:
//! - [`CustodyTransfer`]: asset custody (in-memory: [`crate::CustodyVault`])
//! - [`Issuance`]: reward minting (in-memory: [`crate::RewardIssuer`])
//! - [`TickSource`]: host time (in-memory: [`crate::ManualTicks`])

use epochvault_types::{Amount, AssetId, CollaboratorId, ParticipantId, Result, Tick};

/// Undo support for a collaborator's effects within one engine operation.
///
/// The engine takes a savepoint before an operation, rolls back to it if any
/// later step fails, and commits once the operation has succeeded.
pub trait Journaled {
    /// Opaque marker of the collaborator's state.
    type Savepoint;

    /// Mark the current state.
    fn savepoint(&self) -> Self::Savepoint;

    /// Undo every effect applied since `savepoint` was taken.
    fn rollback_to(&mut self, savepoint: Self::Savepoint);

    /// Forget the undo history. Effects become permanent.
    fn commit(&mut self);
}

/// Moves non-fungible assets into and out of custody.
///
/// Both transfers must fail without effect if the caller is not entitled to
/// move the asset or the asset is unknown, and must leave the recipient as
/// sole holder on success.
pub trait CustodyTransfer: Journaled {
    /// Identity of this custody collaborator.
    fn id(&self) -> CollaboratorId;

    /// Take `asset_id` from `from` into custody.
    fn transfer_in(&mut self, from: ParticipantId, asset_id: AssetId) -> Result<()>;

    /// Release `asset_id` from custody to `to`.
    fn transfer_out(&mut self, to: ParticipantId, asset_id: AssetId) -> Result<()>;
}

/// Mints fungible reward.
///
/// Only an authorized `minter` may issue. On success the recipient's balance
/// and the total supply both grow by exactly `amount`.
pub trait Issuance: Journaled {
    /// Identity of this issuance collaborator.
    fn id(&self) -> CollaboratorId;

    /// Mint `amount` to `to` on behalf of `minter`.
    fn issue(&mut self, minter: CollaboratorId, to: ParticipantId, amount: Amount) -> Result<()>;
}

/// The host's monotonically non-decreasing counter. Read-only for the engine.
pub trait TickSource {
    fn now(&self) -> Tick;
}
