//! The flat error taxonomy shared by every ledger operation.
//!
//! Each variant carries a stable numeric code. Codes 100–120 keep the numbering
//! of the deployed contract; later codes cover kinds that contract folded into
//! other codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a [`LedgerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Authorization,
    Validation,
    NotFound,
    StateConflict,
    LimitExceeded,
    External,
}

/// Error returned by every fallible ledger operation.
///
/// Errors are terminal for the call that produced them and leave no trace in
/// ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("caller is not the governance authority")]
    NotAuthorized,

    #[error("proof hash must be exactly 32 bytes")]
    InvalidProofHash,

    #[error("credential type must be 1 to 100 characters")]
    InvalidCredentialType,

    #[error("proof hash is already registered")]
    ProofAlreadyExists,

    #[error("proof not found")]
    ProofNotFound,

    #[error("proof is already verified")]
    AlreadyVerified,

    #[error("proof has been rejected")]
    ProofRejected,

    #[error("caller is not an active registered institution")]
    InstitutionNotRegistered,

    #[error("caller is not a registered user")]
    UserNotRegistered,

    #[error("verification level must be between 1 and 5")]
    InvalidVerificationLevel,

    #[error("expiry must be later than the current height")]
    InvalidExpiry,

    #[error("proof has expired")]
    ProofExpired,

    #[error("signature must be exactly 65 bytes")]
    InvalidSignature,

    #[error("user has reached the maximum number of proofs")]
    MaxProofsExceeded,

    #[error("metadata must be at most 256 characters")]
    InvalidMetadata,

    #[error("only the proof owner may revoke it")]
    RevocationNotAllowed,

    #[error("revocation reason must be at most 100 characters")]
    InvalidRevocationReason,

    #[error("governance authority has not been set")]
    AuthorityNotSet,

    #[error("invalid governance parameter")]
    InvalidParameter,

    #[error("governance authority is already set")]
    AuthorityAlreadySet,

    #[error("caller is already registered")]
    AlreadyRegistered,

    #[error("institution name must be 1 to 100 characters")]
    InvalidName,

    #[error("only verified proofs can be revoked")]
    ProofNotEligibleForRevocation,

    #[error("proof is already revoked")]
    ProofAlreadyRevoked,

    #[error("fee transfer failed: {0}")]
    TransferFailed(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Stable numeric code reported to callers.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::InvalidProofHash => 101,
            Self::InvalidCredentialType => 102,
            Self::ProofAlreadyExists => 104,
            Self::ProofNotFound => 105,
            Self::AlreadyVerified => 106,
            Self::ProofRejected => 107,
            Self::InstitutionNotRegistered => 109,
            Self::UserNotRegistered => 110,
            Self::InvalidVerificationLevel => 111,
            Self::InvalidExpiry => 112,
            Self::ProofExpired => 113,
            Self::InvalidSignature => 114,
            Self::MaxProofsExceeded => 115,
            Self::InvalidMetadata => 116,
            Self::RevocationNotAllowed => 117,
            Self::InvalidRevocationReason => 118,
            Self::AuthorityNotSet => 119,
            Self::InvalidParameter => 120,
            Self::AuthorityAlreadySet => 121,
            Self::AlreadyRegistered => 122,
            Self::InvalidName => 123,
            Self::ProofNotEligibleForRevocation => 124,
            Self::ProofAlreadyRevoked => 125,
            Self::TransferFailed(_) => 126,
            Self::Storage(_) => 127,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAuthorized
            | Self::AuthorityNotSet
            | Self::InstitutionNotRegistered
            | Self::UserNotRegistered
            | Self::RevocationNotAllowed => ErrorCategory::Authorization,
            Self::InvalidProofHash
            | Self::InvalidCredentialType
            | Self::InvalidVerificationLevel
            | Self::InvalidExpiry
            | Self::InvalidSignature
            | Self::InvalidMetadata
            | Self::InvalidRevocationReason
            | Self::InvalidParameter
            | Self::InvalidName => ErrorCategory::Validation,
            Self::ProofNotFound => ErrorCategory::NotFound,
            Self::ProofAlreadyExists
            | Self::AlreadyVerified
            | Self::ProofRejected
            | Self::ProofExpired
            | Self::AuthorityAlreadySet
            | Self::AlreadyRegistered
            | Self::ProofNotEligibleForRevocation
            | Self::ProofAlreadyRevoked => ErrorCategory::StateConflict,
            Self::MaxProofsExceeded => ErrorCategory::LimitExceeded,
            Self::TransferFailed(_) | Self::Storage(_) => ErrorCategory::External,
        }
    }
}
