//! Proof lifecycle states.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a proof, derived from its stored flags.
///
/// `Submitted → {Verified, Rejected}` and `Verified → Revoked`. `Rejected` and
/// `Revoked` are terminal; no transition is reversible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofState {
    /// Awaiting an institution's decision.
    Submitted,
    /// Verified by a registered institution.
    Verified,
    /// Rejected by a registered institution.
    Rejected,
    /// Verified, then withdrawn by its owner.
    Revoked,
}

impl ProofState {
    /// Derive the state from the stored lifecycle flags.
    ///
    /// Returns `None` for flag combinations the lifecycle can never produce
    /// (verified and rejected together, or revoked without verified).
    pub fn from_flags(verified: bool, rejected: bool, revoked: bool) -> Option<Self> {
        match (verified, rejected, revoked) {
            (false, false, false) => Some(Self::Submitted),
            (true, false, false) => Some(Self::Verified),
            (false, true, false) => Some(Self::Rejected),
            (true, false, true) => Some(Self::Revoked),
            _ => None,
        }
    }

    /// Whether an institution may still decide on this proof.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Revoked)
    }

    /// Lowercase name used in logs and JSON outcomes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Revoked => "revoked",
        }
    }
}
