//! All governable ledger parameters.

use serde::{Deserialize, Serialize};

/// Enum of the ledger parameters the authority can change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    MaxProofsPerUser,
    VerificationFee,
}

impl GovernableParam {
    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaxProofsPerUser => "max_proofs_per_user",
            Self::VerificationFee => "verification_fee",
        }
    }
}
