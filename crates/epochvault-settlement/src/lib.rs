//! # epochvault-settlement
//!
//! **Settlement plane**: lock bookkeeping, checkpoint settlement, and the
//! participant-facing operations.
//!
//! ## Architecture
//!
//! [`SettlementEngine`] owns the [`LockRegistry`] and the [`EventLog`] and
//! borrows the clock and curve from `epochvault-accrual`. For every
//! operation it:
//! 1. Reads the current epoch from the host's tick source
//! 2. Settles owed reward and advances checkpoints
//! 3. Delegates issuance and custody to the collaborators
//! 4. Mutates the registry and logs the committed events
//!
//! Any failure in steps 2-4 unwinds the whole operation.

pub mod engine;
pub mod event_log;
pub mod registry;

pub use engine::SettlementEngine;
pub use event_log::EventLog;
pub use registry::LockRegistry;
