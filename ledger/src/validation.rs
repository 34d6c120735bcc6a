//! Stateless input checks for lifecycle calls.
//!
//! These run before any state is consulted, in a fixed order: the first
//! failing check determines the error.

use credence_types::params::{
    char_len, is_valid_verification_level, MAX_CREDENTIAL_TYPE_LEN, MAX_METADATA_LEN,
    MAX_REVOCATION_REASON_LEN,
};
use credence_types::{Height, InstitutionSignature, LedgerError, ProofHash};

/// Arguments of a proof submission, exactly as supplied by the caller.
#[derive(Clone, Copy, Debug)]
pub struct ProofSubmission<'a> {
    /// Raw content hash; must be 32 bytes.
    pub proof_hash: &'a [u8],
    pub credential_type: &'a str,
    pub metadata: &'a str,
    pub expiry: Height,
    pub verification_level: u32,
}

impl<'a> ProofSubmission<'a> {
    /// Run the input checks against the current height and return the
    /// parsed hash.
    ///
    /// Order: hash length, credential type, metadata, expiry, level.
    pub fn validate(&self, now: Height) -> Result<ProofHash, LedgerError> {
        let hash = ProofHash::from_slice(self.proof_hash).ok_or(LedgerError::InvalidProofHash)?;

        let type_len = char_len(self.credential_type);
        if type_len == 0 || type_len > MAX_CREDENTIAL_TYPE_LEN {
            return Err(LedgerError::InvalidCredentialType);
        }
        if char_len(self.metadata) > MAX_METADATA_LEN {
            return Err(LedgerError::InvalidMetadata);
        }
        if self.expiry <= now {
            return Err(LedgerError::InvalidExpiry);
        }
        if !is_valid_verification_level(self.verification_level) {
            return Err(LedgerError::InvalidVerificationLevel);
        }
        Ok(hash)
    }
}

pub fn parse_signature(bytes: &[u8]) -> Result<InstitutionSignature, LedgerError> {
    InstitutionSignature::from_slice(bytes).ok_or(LedgerError::InvalidSignature)
}

pub fn check_revocation_reason(reason: &str) -> Result<(), LedgerError> {
    if char_len(reason) > MAX_REVOCATION_REASON_LEN {
        return Err(LedgerError::InvalidRevocationReason);
    }
    Ok(())
}
