//! Ledger parameters and input bounds.
//!
//! The two governable values live in [`LedgerParams`]; the fixed input bounds
//! are constants because no governance operation can change them.

use crate::amount::FeeAmount;
use serde::{Deserialize, Serialize};

/// Longest accepted credential type, in characters.
pub const MAX_CREDENTIAL_TYPE_LEN: usize = 100;

/// Longest accepted proof metadata, in characters.
pub const MAX_METADATA_LEN: usize = 256;

/// Longest accepted revocation reason, in characters.
pub const MAX_REVOCATION_REASON_LEN: usize = 100;

/// Longest accepted institution name, in characters.
pub const MAX_INSTITUTION_NAME_LEN: usize = 100;

/// Lowest verification level a proof may request.
pub const MIN_VERIFICATION_LEVEL: u32 = 1;

/// Highest verification level a proof may request.
pub const MAX_VERIFICATION_LEVEL: u32 = 5;

/// Governable ledger parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Maximum number of proofs a single user may ever submit. Default: 50.
    pub max_proofs_per_user: u64,

    /// Fee charged on every successful submission, paid to the authority.
    /// Zero is allowed. Default: 500.
    pub verification_fee: FeeAmount,
}

impl LedgerParams {
    pub const DEFAULT_MAX_PROOFS_PER_USER: u64 = 50;
    pub const DEFAULT_VERIFICATION_FEE: u128 = 500;
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            max_proofs_per_user: Self::DEFAULT_MAX_PROOFS_PER_USER,
            verification_fee: FeeAmount::new(Self::DEFAULT_VERIFICATION_FEE),
        }
    }
}

/// Whether `level` lies in the accepted verification range.
pub fn is_valid_verification_level(level: u32) -> bool {
    (MIN_VERIFICATION_LEVEL..=MAX_VERIFICATION_LEVEL).contains(&level)
}

/// Character count of `s`, used for every length bound above.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
