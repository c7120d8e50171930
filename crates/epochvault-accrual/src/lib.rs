//! # epochvault-accrual
//!
//! **Pure accrual math for epochvault.**
//!
//! Two leaf components with no state beyond their fixed parameters:
//!
//! - [`EpochClock`]: maps a host tick to an epoch index, anchored at the tick
//!   observed when the engine started.
//! - [`RewardCurve`]: per-epoch reward, decreasing linearly and floored at
//!   zero, plus exact sums over half-open epoch ranges.
//!
//! Both are deterministic: same parameters + same input → same output.

pub mod clock;
pub mod curve;

pub use clock::EpochClock;
pub use curve::RewardCurve;
