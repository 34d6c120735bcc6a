//! User storage trait.

use crate::StoreError;
use credence_types::{Height, Principal};
use serde::{Deserialize, Serialize};

/// A registered credential holder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub principal: Principal,
    pub registered_at: Height,
    /// Number of proofs this user has successfully submitted. Never decreases.
    pub proof_count: u64,
}

/// Trait for user storage operations.
pub trait UserStore {
    fn get_user(&self, principal: &Principal) -> Result<Option<UserRecord>, StoreError>;
    fn put_user(&self, record: &UserRecord) -> Result<(), StoreError>;
    fn user_count(&self) -> Result<u64, StoreError>;
    /// All users, ordered by principal.
    fn iter_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    fn user_exists(&self, principal: &Principal) -> Result<bool, StoreError> {
        self.get_user(principal).map(|u| u.is_some())
    }
}
