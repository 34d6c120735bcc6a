//! Proof storage trait and the proof record.

use crate::{StoreError, UserRecord};
use credence_types::{Height, InstitutionSignature, Principal, ProofHash, ProofId, ProofState};
use serde::{Deserialize, Serialize};

/// A submitted credential proof and its lifecycle flags.
///
/// `verified` and `rejected` are mutually exclusive; `revoked` implies
/// `verified`. The optional fields are present exactly when their flag is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    pub id: ProofId,
    /// The user who submitted the proof.
    pub owner: Principal,
    pub proof_hash: ProofHash,
    pub credential_type: String,
    pub metadata: String,
    pub submitted_at: Height,
    /// Height from which the proof can no longer be verified.
    pub expiry: Height,
    pub verification_level: u32,
    pub verified: bool,
    pub rejected: bool,
    /// Institution that verified the proof.
    pub institution: Option<Principal>,
    pub signature: Option<InstitutionSignature>,
    pub revoked: bool,
    pub revocation_reason: Option<String>,
    pub revoked_at: Option<Height>,
}

impl ProofRecord {
    /// Lifecycle state derived from the stored flags.
    pub fn state(&self) -> Option<ProofState> {
        ProofState::from_flags(self.verified, self.rejected, self.revoked)
    }

    /// Whether this proof counts as a valid credential at height `now`.
    ///
    /// Recomputed on every call: a proof stops being valid once the height
    /// moves past its expiry even though no stored field changes.
    pub fn is_verified_at(&self, now: Height) -> bool {
        self.verified && !self.rejected && !self.revoked && self.expiry >= now
    }

    /// Whether the stored flags and optional fields agree with each other.
    pub fn is_consistent(&self) -> bool {
        self.state().is_some()
            && self.institution.is_some() == self.verified
            && self.signature.is_some() == self.verified
            && self.revocation_reason.is_some() == self.revoked
            && self.revoked_at.is_some() == self.revoked
    }
}

/// Trait for proof storage operations.
///
/// Proofs are keyed by id with a secondary index from content hash to id. The
/// two must always agree.
pub trait ProofStore {
    /// Return the next proof id and reserve it.
    fn next_id(&self) -> Result<ProofId, StoreError>;

    /// Store a newly submitted proof and its owner's updated record as one
    /// write, returning the id assigned to the proof.
    ///
    /// The store reserves the next id as part of the commit and ignores
    /// `proof.id`. Every check runs
    /// before anything is written: on any error the proof, the hash index,
    /// `owner` and the id counter are all left as they were. A taken hash is
    /// reported as [`StoreError::Duplicate`].
    fn commit_submission(
        &self,
        proof: ProofRecord,
        owner: &UserRecord,
    ) -> Result<ProofId, StoreError>;

    /// The id the next reservation will return.
    fn peek_next_id(&self) -> Result<ProofId, StoreError>;

    /// Reset the id counter. Only used when restoring a snapshot into an
    /// empty store.
    fn set_next_id(&self, next: ProofId) -> Result<(), StoreError>;

    /// Insert a new proof and index its hash.
    ///
    /// Fails with [`StoreError::Duplicate`] if the hash is already indexed;
    /// in that case neither map is modified.
    fn insert_proof(&self, proof: &ProofRecord) -> Result<(), StoreError>;

    fn get_proof(&self, id: ProofId) -> Result<Option<ProofRecord>, StoreError>;

    fn proof_id_by_hash(&self, hash: &ProofHash) -> Result<Option<ProofId>, StoreError>;

    /// Apply `mutate` to the stored record and return the updated copy.
    ///
    /// The caller guarantees the id exists; a missing id is reported as
    /// [`StoreError::NotFound`]. The hash index is not touched: mutators must
    /// not change `proof_hash` or `id`.
    fn update_proof<F>(&self, id: ProofId, mutate: F) -> Result<ProofRecord, StoreError>
    where
        F: FnOnce(&mut ProofRecord);

    fn proof_count(&self) -> Result<u64, StoreError>;

    /// All proofs, ordered by id.
    fn iter_proofs(&self) -> Result<Vec<ProofRecord>, StoreError>;

    fn get_proof_by_hash(&self, hash: &ProofHash) -> Result<Option<ProofRecord>, StoreError> {
        match self.proof_id_by_hash(hash)? {
            Some(id) => self.get_proof(id),
            None => Ok(None),
        }
    }

    fn hash_exists(&self, hash: &ProofHash) -> Result<bool, StoreError> {
        self.proof_id_by_hash(hash).map(|id| id.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(expiry: u64) -> ProofRecord {
        ProofRecord {
            id: ProofId::new(0),
            owner: Principal::new("ST1TEST"),
            proof_hash: ProofHash::new([1u8; 32]),
            credential_type: "BSc".into(),
            metadata: "Degree in CS".into(),
            submitted_at: Height::new(0),
            expiry: Height::new(expiry),
            verification_level: 3,
            verified: false,
            rejected: false,
            institution: None,
            signature: None,
            revoked: false,
            revocation_reason: None,
            revoked_at: None,
        }
    }

    fn verified(expiry: u64) -> ProofRecord {
        ProofRecord {
            verified: true,
            institution: Some(Principal::new("ST3INST")),
            signature: Some(InstitutionSignature::new([2u8; 65])),
            ..submitted(expiry)
        }
    }

    #[test]
    fn submitted_proof_is_not_verified() {
        let proof = submitted(100);
        assert_eq!(proof.state(), Some(ProofState::Submitted));
        assert!(!proof.is_verified_at(Height::new(0)));
        assert!(proof.is_consistent());
    }

    #[test]
    fn verified_proof_is_valid_through_expiry_height() {
        let proof = verified(100);
        assert!(proof.is_verified_at(Height::new(50)));
        assert!(proof.is_verified_at(Height::new(100)));
        assert!(!proof.is_verified_at(Height::new(101)));
    }

    #[test]
    fn revoked_proof_is_not_verified() {
        let proof = ProofRecord {
            revoked: true,
            revocation_reason: Some("Invalid data".into()),
            revoked_at: Some(Height::new(10)),
            ..verified(100)
        };
        assert_eq!(proof.state(), Some(ProofState::Revoked));
        assert!(!proof.is_verified_at(Height::new(10)));
        assert!(proof.is_consistent());
    }

    #[test]
    fn missing_signature_is_inconsistent() {
        let proof = ProofRecord {
            signature: None,
            ..verified(100)
        };
        assert!(!proof.is_consistent());
    }
}
