//! Events emitted by the lifecycle engine for the host to publish.

use credence_governance::GovernableParam;
use credence_types::{FeeAmount, Height, Principal, ProofHash, ProofId};
use serde::{Deserialize, Serialize};

/// A state change applied by a successful call. Failed calls emit nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    AuthoritySet {
        authority: Principal,
    },
    ParameterChanged {
        param: GovernableParam,
        value: u128,
    },
    UserRegistered {
        user: Principal,
        height: Height,
    },
    InstitutionRegistered {
        institution: Principal,
        name: String,
        height: Height,
    },
    /// A proof was accepted and its fee transferred to the authority.
    ProofSubmitted {
        id: ProofId,
        owner: Principal,
        proof_hash: ProofHash,
        fee: FeeAmount,
        authority: Principal,
    },
    ProofVerified {
        id: ProofId,
        institution: Principal,
        height: Height,
    },
    ProofRejected {
        id: ProofId,
        institution: Principal,
        height: Height,
    },
    ProofRevoked {
        id: ProofId,
        owner: Principal,
        reason: String,
        height: Height,
    },
}

impl LedgerEvent {
    /// Short topic name, used as the event kind in logs and JSON output.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::AuthoritySet { .. } => "authority_set",
            Self::ParameterChanged { .. } => "parameter_changed",
            Self::UserRegistered { .. } => "user_registered",
            Self::InstitutionRegistered { .. } => "institution_registered",
            Self::ProofSubmitted { .. } => "proof_submitted",
            Self::ProofVerified { .. } => "proof_verified",
            Self::ProofRejected { .. } => "proof_rejected",
            Self::ProofRevoked { .. } => "proof_revoked",
        }
    }

    /// The proof this event concerns, if any.
    pub fn proof_id(&self) -> Option<ProofId> {
        match self {
            Self::ProofSubmitted { id, .. }
            | Self::ProofVerified { id, .. }
            | Self::ProofRejected { id, .. }
            | Self::ProofRevoked { id, .. } => Some(*id),
            _ => None,
        }
    }
}
