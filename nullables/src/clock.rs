//! Nullable height source: deterministic ledger height for testing.

use credence_types::Height;
use std::cell::Cell;

/// A deterministic height source for testing.
///
/// The height only advances when you tell it to.
pub struct NullHeight {
    current: Cell<u64>,
}

impl NullHeight {
    pub fn new(initial: u64) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    /// Get the current height.
    pub fn now(&self) -> Height {
        Height::new(self.current.get())
    }

    /// Advance the height by a number of blocks, saturating at `u64::MAX`.
    pub fn advance(&self, blocks: u64) {
        self.current.set(self.now().saturating_add(blocks).value());
    }

    /// Set the height to a specific value.
    pub fn set(&self, height: u64) {
        self.current.set(height);
    }
}

impl Default for NullHeight {
    fn default() -> Self {
        Self::new(0)
    }
}
