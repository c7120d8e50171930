//! # epochvault-custody
//!
//! **Collaborator boundary** for the settlement engine: everything the engine
//! delegates to and never implements itself.
//!
//! ## Traits
//!
//! 1. **CustodyTransfer**: moves a non-fungible asset into and out of custody
//! 2. **Issuance**: mints fungible reward to a participant
//! 3. **TickSource**: the host's monotonic counter
//! 4. **Journaled**: savepoint / rollback / commit, so the engine can undo a
//!    delegation when a later step of the same operation fails
//!
//! ## Reference implementations
//!
//! - [`CustodyVault`]: in-memory asset ownership
//! - [`RewardIssuer`]: in-memory balances with minter authorization and a
//!   [`SupplyConservation`] check
//! - [`ManualTicks`]: shared counter advanced by the host (or a test)

pub mod collaborator;
pub mod issuer;
pub mod supply;
pub mod ticks;
pub mod vault;

pub use collaborator::{CustodyTransfer, Issuance, Journaled, TickSource};
pub use issuer::RewardIssuer;
pub use supply::SupplyConservation;
pub use ticks::ManualTicks;
pub use vault::{CustodyVault, Holder};
