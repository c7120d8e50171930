//! # epochvault-types
//!
//! Shared types, errors, and configuration for the **epochvault** reward-accrual
//! ledger.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`CollaboratorId`], [`AssetId`], [`EpochId`]
//! - **Scalars**: [`Tick`], [`Amount`]
//! - **Lock model**: [`LockRecord`]
//! - **Event model**: [`LedgerEvent`], [`EventRecord`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`EpochvaultError`] with `EV_ERR_` prefix codes
//! - **Constants**: system-wide defaults and bounds

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod lock;

// Re-export all primary types at crate root for ergonomic imports:
//   use epochvault_types::{AssetId, LockRecord, LedgerEvent, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use lock::*;

// Constants are accessed via `epochvault_types::constants::FOO`
// (not re-exported to avoid name collisions).
