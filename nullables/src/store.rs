//! Nullable store: thread-safe in-memory storage for testing.

use credence_store::{
    InstitutionRecord, InstitutionStore, ProofRecord, ProofStore, StoreError, UserRecord,
    UserStore,
};
use credence_types::{Principal, ProofHash, ProofId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory user + institution + proof store for testing.
///
/// Maps are ordered so iteration matches the ordering the traits promise.
pub struct NullStore {
    users: Mutex<BTreeMap<Principal, UserRecord>>,
    institutions: Mutex<BTreeMap<Principal, InstitutionRecord>>,
    proofs: Mutex<BTreeMap<ProofId, ProofRecord>>,
    proofs_by_hash: Mutex<BTreeMap<ProofHash, ProofId>>,
    next_id: Mutex<ProofId>,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(BTreeMap::new()),
            institutions: Mutex::new(BTreeMap::new()),
            proofs: Mutex::new(BTreeMap::new()),
            proofs_by_hash: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(ProofId::FIRST),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of entries in the hash index (should always equal the proof count).
    pub fn hash_index_len(&self) -> usize {
        self.proofs_by_hash.lock().unwrap().len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("writes disabled".into()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for NullStore {
    fn get_user(&self, principal: &Principal) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().unwrap().get(principal).cloned())
    }

    fn put_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.users
            .lock()
            .unwrap()
            .insert(record.principal.clone(), record.clone());
        Ok(())
    }

    fn user_count(&self) -> Result<u64, StoreError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    fn iter_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }
}

impl InstitutionStore for NullStore {
    fn get_institution(
        &self,
        principal: &Principal,
    ) -> Result<Option<InstitutionRecord>, StoreError> {
        Ok(self.institutions.lock().unwrap().get(principal).cloned())
    }

    fn put_institution(&self, record: &InstitutionRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.institutions
            .lock()
            .unwrap()
            .insert(record.principal.clone(), record.clone());
        Ok(())
    }

    fn institution_count(&self) -> Result<u64, StoreError> {
        Ok(self.institutions.lock().unwrap().len() as u64)
    }

    fn iter_institutions(&self) -> Result<Vec<InstitutionRecord>, StoreError> {
        Ok(self.institutions.lock().unwrap().values().cloned().collect())
    }
}

impl ProofStore for NullStore {
    fn next_id(&self) -> Result<ProofId, StoreError> {
        self.check_writable()?;
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next = id.next().ok_or(StoreError::IdExhausted)?;
        Ok(id)
    }

    fn commit_submission(
        &self,
        mut proof: ProofRecord,
        owner: &UserRecord,
    ) -> Result<ProofId, StoreError> {
        self.check_writable()?;
        // Lock order: users, counter, index, primary. All held until written.
        let mut users = self.users.lock().unwrap();
        let mut next = self.next_id.lock().unwrap();
        let mut index = self.proofs_by_hash.lock().unwrap();
        let mut proofs = self.proofs.lock().unwrap();

        let id = *next;
        let following = id.next().ok_or(StoreError::IdExhausted)?;
        if index.contains_key(&proof.proof_hash) {
            return Err(StoreError::Duplicate(proof.proof_hash.to_string()));
        }
        if proofs.contains_key(&id) {
            return Err(StoreError::Backend(format!("proof id {id} already occupied")));
        }
        if !users.contains_key(&owner.principal) {
            return Err(StoreError::NotFound(format!("user {}", owner.principal)));
        }

        proof.id = id;
        index.insert(proof.proof_hash, id);
        proofs.insert(id, proof);
        users.insert(owner.principal.clone(), owner.clone());
        *next = following;
        Ok(id)
    }

    fn peek_next_id(&self) -> Result<ProofId, StoreError> {
        Ok(*self.next_id.lock().unwrap())
    }

    fn set_next_id(&self, next: ProofId) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.next_id.lock().unwrap() = next;
        Ok(())
    }

    fn insert_proof(&self, proof: &ProofRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        // Lock order: index before primary, everywhere.
        let mut index = self.proofs_by_hash.lock().unwrap();
        if index.contains_key(&proof.proof_hash) {
            return Err(StoreError::Duplicate(proof.proof_hash.to_string()));
        }
        let mut proofs = self.proofs.lock().unwrap();
        if proofs.contains_key(&proof.id) {
            return Err(StoreError::Duplicate(format!("proof id {}", proof.id)));
        }
        index.insert(proof.proof_hash, proof.id);
        proofs.insert(proof.id, proof.clone());
        Ok(())
    }

    fn get_proof(&self, id: ProofId) -> Result<Option<ProofRecord>, StoreError> {
        Ok(self.proofs.lock().unwrap().get(&id).cloned())
    }

    fn proof_id_by_hash(&self, hash: &ProofHash) -> Result<Option<ProofId>, StoreError> {
        Ok(self.proofs_by_hash.lock().unwrap().get(hash).copied())
    }

    fn update_proof<F>(&self, id: ProofId, mutate: F) -> Result<ProofRecord, StoreError>
    where
        F: FnOnce(&mut ProofRecord),
    {
        self.check_writable()?;
        let mut proofs = self.proofs.lock().unwrap();
        let record = proofs
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("proof {id}")))?;
        let mut updated = record.clone();
        mutate(&mut updated);
        debug_assert_eq!(updated.id, record.id);
        debug_assert_eq!(updated.proof_hash, record.proof_hash);
        *record = updated.clone();
        Ok(updated)
    }

    fn proof_count(&self) -> Result<u64, StoreError> {
        Ok(self.proofs.lock().unwrap().len() as u64)
    }

    fn iter_proofs(&self) -> Result<Vec<ProofRecord>, StoreError> {
        Ok(self.proofs.lock().unwrap().values().cloned().collect())
    }
}
