//! Institution storage trait.

use crate::StoreError;
use credence_types::{Height, Principal};
use serde::{Deserialize, Serialize};

/// A registered verifying institution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub principal: Principal,
    pub name: String,
    pub registered_at: Height,
    /// Only active institutions may verify or reject proofs.
    pub active: bool,
}

/// Trait for institution storage operations.
pub trait InstitutionStore {
    fn get_institution(&self, principal: &Principal) -> Result<Option<InstitutionRecord>, StoreError>;
    fn put_institution(&self, record: &InstitutionRecord) -> Result<(), StoreError>;
    fn institution_count(&self) -> Result<u64, StoreError>;
    /// All institutions, ordered by principal.
    fn iter_institutions(&self) -> Result<Vec<InstitutionRecord>, StoreError>;

    fn institution_exists(&self, principal: &Principal) -> Result<bool, StoreError> {
        self.get_institution(principal).map(|i| i.is_some())
    }
}
