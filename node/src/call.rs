//! Serializable call envelopes and outcomes.
//!
//! One [`CallEnvelope`] is one host call: who made it, at which height, and
//! which ledger operation with which arguments. Byte arguments travel as hex
//! strings so envelopes stay readable as JSON lines.
//!
//! ```json
//! {"caller":"ST1TEST","height":0,"call":{"op":"register_user"}}
//! {"caller":"ST1TEST","height":3,"call":{"op":"submit_proof","proof_hash":"01…","credential_type":"BSc","metadata":"","expiry":100,"verification_level":3}}
//! ```

use serde::{Deserialize, Serialize};

use credence_types::{LedgerError, Principal};

/// A single ledger operation and its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerCall {
    SetAuthority {
        authority: Principal,
    },
    SetMaxProofsPerUser {
        max: u64,
    },
    SetVerificationFee {
        fee: u64,
    },
    RegisterInstitution {
        name: String,
    },
    RegisterUser,
    SubmitProof {
        #[serde(with = "hex_bytes")]
        proof_hash: Vec<u8>,
        credential_type: String,
        #[serde(default)]
        metadata: String,
        expiry: u64,
        verification_level: u32,
    },
    VerifyProof {
        id: u64,
        #[serde(with = "hex_bytes")]
        signature: Vec<u8>,
    },
    RejectProof {
        id: u64,
    },
    RevokeProof {
        id: u64,
        #[serde(default)]
        reason: String,
    },
    GetProof {
        id: u64,
    },
    IsProofVerified {
        id: u64,
    },
    ProofState {
        id: u64,
    },
}

impl LedgerCall {
    /// Operation name as it appears in the `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetAuthority { .. } => "set_authority",
            Self::SetMaxProofsPerUser { .. } => "set_max_proofs_per_user",
            Self::SetVerificationFee { .. } => "set_verification_fee",
            Self::RegisterInstitution { .. } => "register_institution",
            Self::RegisterUser => "register_user",
            Self::SubmitProof { .. } => "submit_proof",
            Self::VerifyProof { .. } => "verify_proof",
            Self::RejectProof { .. } => "reject_proof",
            Self::RevokeProof { .. } => "revoke_proof",
            Self::GetProof { .. } => "get_proof",
            Self::IsProofVerified { .. } => "is_proof_verified",
            Self::ProofState { .. } => "proof_state",
        }
    }

    /// Read-only calls never change ledger state.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::GetProof { .. } | Self::IsProofVerified { .. } | Self::ProofState { .. }
        )
    }
}

/// A call together with the host-supplied caller and height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub caller: Principal,
    pub height: u64,
    pub call: LedgerCall,
}

impl CallEnvelope {
    pub fn new(caller: impl Into<Principal>, height: u64, call: LedgerCall) -> Self {
        Self {
            caller: caller.into(),
            height,
            call,
        }
    }
}

/// Result of a dispatched call.
///
/// Serializes as `{"ok": <value>}` or `{"error": {"code": 105, "message": "..."}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Ok(serde_json::Value),
    Error { code: u32, message: String },
}

impl CallOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Numeric error code, if the call failed.
    pub fn error_code(&self) -> Option<u32> {
        match self {
            Self::Ok(_) => None,
            Self::Error { code, .. } => Some(*code),
        }
    }
}

impl From<LedgerError> for CallOutcome {
    fn from(e: LedgerError) -> Self {
        Self::Error {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Hex string encoding for byte fields.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
