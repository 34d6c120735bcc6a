//! Fee amount type.
//!
//! Amounts are raw integer units of the host ledger's native currency (u128),
//! never floating point. The ledger decides fee amounts; moving balances is the
//! host's job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A verification fee, in raw units of the host currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeAmount(u128);

impl FeeAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}

impl From<u128> for FeeAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}
