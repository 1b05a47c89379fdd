//! Shared helpers for unit tests

use core::cell::Cell;

use crate::clock::Clock;

/// Clock whose time only moves when a test says so
#[derive(Debug, Default)]
pub(crate) struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub(crate) fn at(now_ms: u64) -> Self {
        Self {
            now: Cell::new(now_ms),
        }
    }

    pub(crate) fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
