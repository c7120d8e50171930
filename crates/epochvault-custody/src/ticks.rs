//! Host-advanced tick counter.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use epochvault_types::Tick;

use crate::collaborator::TickSource;

/// Shared monotonic counter. Clones observe the same value, so a host can
/// keep one handle and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    value: Arc<AtomicU64>,
}

impl ManualTicks {
    #[must_use]
    pub fn new(start: Tick) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the counter to `tick`. Earlier values are ignored.
    pub fn set(&self, tick: Tick) {
        self.value.fetch_max(tick, Ordering::SeqCst);
    }

    /// Move the counter forward by `delta`, saturating.
    pub fn advance(&self, delta: u64) {
        // The closure always returns Some, so the update cannot fail.
        let _ = self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(delta))
            });
    }
}

impl TickSource for ManualTicks {
    fn now(&self) -> Tick {
        self.value.load(Ordering::SeqCst)
    }
}
