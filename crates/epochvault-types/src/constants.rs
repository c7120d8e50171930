//! System-wide constants for the epochvault ledger.

/// Asset identifiers must fit in this many bits to be accepted at deposit.
pub const COMPACT_ID_BITS: u32 = 192;

/// Default epoch length in host ticks.
pub const DEFAULT_EPOCH_LENGTH: u64 = 300;

/// Default reward paid for epoch 0.
pub const DEFAULT_START_AMOUNT: u128 = 10_000;

/// Default per-epoch decrease of the reward.
pub const DEFAULT_DECREASE_RATE: u128 = 100;

/// Minimum number of epoch boundaries a lock must cross before withdrawal.
pub const MIN_HOLDING_EPOCHS: u64 = 1;

/// Domain separator for the event log hash chain.
pub const EVENT_DIGEST_DOMAIN: &[u8] = b"epochvault:event:v1:";

/// Digest of the (virtual) record preceding the first event.
pub const GENESIS_DIGEST: [u8; 32] = [0u8; 32];

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "epochvault";
