//! Logical clock supplied by the host ledger.
//!
//! Heights are opaque, monotonically non-decreasing values. They are used for
//! registration and submission timestamps and for expiry comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger height (block height or equivalent logical clock).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(u64);

impl Height {
    /// The genesis height.
    pub const GENESIS: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Height `blocks` after this one, saturating at `u64::MAX`.
    pub fn saturating_add(self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }

    /// Whether a validity window ending at `self` has closed at `now`.
    ///
    /// The window is closed exactly at the boundary: `now >= self`.
    pub fn is_reached_at(&self, now: Height) -> bool {
        now.0 >= self.0
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for Height {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
