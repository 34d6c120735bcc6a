//! Ledger snapshots: capture the full ledger state at a given height.
//!
//! A snapshot lets a host persist the ledger and rebuild an identical engine
//! later without replaying every call. The snapshot hash is a Blake2b-256
//! digest of the bincode-encoded content, so a loaded snapshot can be checked
//! before it is trusted.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::LifecycleEngine;
use credence_governance::{Governance, GovernanceConfig, GovernanceSnapshot};
use credence_store::{
    InstitutionRecord, LedgerStore, ProofRecord, StoreError, TransferSink, UserRecord,
};
use credence_types::{Height, Principal, ProofId};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot digest does not match its content")]
    DigestMismatch,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("target store is not empty")]
    StoreNotEmpty,

    #[error("snapshot violates ledger invariant: {0}")]
    InvariantViolation(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(String),
}

/// Full ledger state captured at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of the bincode encoding of every other field.
    pub hash: [u8; 32],
    pub version: u32,
    /// Height at which the snapshot was taken.
    pub height: Height,
    /// The id the next submitted proof will receive.
    pub next_id: ProofId,
    pub governance: GovernanceSnapshot,
    /// Sorted by principal.
    pub users: Vec<UserRecord>,
    /// Sorted by principal.
    pub institutions: Vec<InstitutionRecord>,
    /// Sorted by id.
    pub proofs: Vec<ProofRecord>,
}

impl LedgerSnapshot {
    /// Capture the state of `engine` at `height`.
    pub fn capture<S: LedgerStore, T: TransferSink>(
        engine: &LifecycleEngine<S, T>,
        height: Height,
    ) -> Result<Self, SnapshotError> {
        let store = engine.store();
        let mut users = store.iter_users()?;
        users.sort_by(|a, b| a.principal.cmp(&b.principal));
        let mut institutions = store.iter_institutions()?;
        institutions.sort_by(|a, b| a.principal.cmp(&b.principal));
        let mut proofs = store.iter_proofs()?;
        proofs.sort_by_key(|p| p.id);

        let mut snap = Self {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            height,
            next_id: store.peek_next_id()?,
            governance: engine.governance().snapshot(),
            users,
            institutions,
            proofs,
        };
        snap.hash = snap.compute_hash()?;
        tracing::info!(
            height = %height,
            users = snap.users.len(),
            institutions = snap.institutions.len(),
            proofs = snap.proofs.len(),
            "ledger snapshot captured"
        );
        Ok(snap)
    }

    fn compute_hash(&self) -> Result<[u8; 32], SnapshotError> {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let content = bincode::serialize(&(
            self.version,
            self.height,
            self.next_id,
            &self.governance,
            &self.users,
            &self.institutions,
            &self.proofs,
        ))
        .map_err(|e| SnapshotError::Codec(e.to_string()))?;

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(&content);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Ok(out)
    }

    /// Check the stored hash against the content.
    pub fn verify(&self) -> bool {
        self.compute_hash().is_ok_and(|h| h == self.hash)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Codec(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(|e| SnapshotError::Codec(e.to_string()))
    }

    pub fn proof_count(&self) -> usize {
        self.proofs.len()
    }

    /// Rebuild an engine from this snapshot on top of an empty `store`.
    ///
    /// The digest, the version and the ledger invariants are all checked
    /// before anything is written.
    pub fn restore<S: LedgerStore, T: TransferSink>(
        &self,
        store: S,
        sink: T,
        config: GovernanceConfig,
    ) -> Result<LifecycleEngine<S, T>, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        if !self.verify() {
            return Err(SnapshotError::DigestMismatch);
        }
        self.check_invariants()?;
        if store.user_count()? != 0
            || store.institution_count()? != 0
            || store.proof_count()? != 0
        {
            return Err(SnapshotError::StoreNotEmpty);
        }

        for user in &self.users {
            store.put_user(user)?;
        }
        for institution in &self.institutions {
            store.put_institution(institution)?;
        }
        for proof in &self.proofs {
            store.insert_proof(proof)?;
        }
        store.set_next_id(self.next_id)?;

        tracing::info!(
            height = %self.height,
            proofs = self.proofs.len(),
            "ledger restored from snapshot"
        );
        let governance = Governance::from_snapshot(self.governance.clone(), config);
        Ok(LifecycleEngine::new(store, sink, governance))
    }

    fn check_invariants(&self) -> Result<(), SnapshotError> {
        let violation = |msg: String| Err(SnapshotError::InvariantViolation(msg));

        let institutions: HashSet<&Principal> =
            self.institutions.iter().map(|i| &i.principal).collect();
        if institutions.len() != self.institutions.len() {
            return violation("duplicate institution".into());
        }

        let mut owned: HashMap<&Principal, u64> = HashMap::new();
        let mut ids = HashSet::new();
        let mut hashes = HashSet::new();
        for proof in &self.proofs {
            if proof.id >= self.next_id {
                return violation(format!("proof {} at or beyond next id {}", proof.id, self.next_id));
            }
            if !ids.insert(proof.id) {
                return violation(format!("duplicate proof id {}", proof.id));
            }
            if !hashes.insert(proof.proof_hash) {
                return violation(format!("duplicate hash {}", proof.proof_hash));
            }
            if !proof.is_consistent() {
                return violation(format!("proof {} has inconsistent flags", proof.id));
            }
            if let Some(inst) = &proof.institution {
                if !institutions.contains(inst) {
                    return violation(format!("proof {} decided by unknown institution {inst}", proof.id));
                }
            }
            *owned.entry(&proof.owner).or_default() += 1;
        }

        let mut users = HashSet::new();
        for user in &self.users {
            if !users.insert(&user.principal) {
                return violation(format!("duplicate user {}", user.principal));
            }
            let actual = owned.get(&user.principal).copied().unwrap_or(0);
            if user.proof_count != actual {
                return violation(format!(
                    "user {} records {} proofs but owns {actual}",
                    user.principal, user.proof_count
                ));
            }
        }
        if let Some(owner) = owned.keys().find(|o| !users.contains(**o)) {
            return violation(format!("proof owner {owner} is not registered"));
        }
        Ok(())
    }
}
