//! Registration and lookup of users and institutions.

use credence_store::{InstitutionRecord, InstitutionStore, StoreError, UserRecord, UserStore};
use credence_types::params::{char_len, MAX_INSTITUTION_NAME_LEN};
use credence_types::{Height, LedgerError, Principal};

pub struct Registry;

impl Registry {
    /// Register `caller` as a credential holder with a proof count of zero.
    pub fn register_user<S: UserStore>(
        &self,
        store: &S,
        caller: &Principal,
        now: Height,
    ) -> Result<UserRecord, LedgerError> {
        if store.user_exists(caller).map_err(storage)? {
            return Err(LedgerError::AlreadyRegistered);
        }
        let record = UserRecord {
            principal: caller.clone(),
            registered_at: now,
            proof_count: 0,
        };
        store.put_user(&record).map_err(storage)?;
        tracing::info!(user = %caller, height = %now, "user registered");
        Ok(record)
    }

    /// Register `caller` as an active verifying institution.
    pub fn register_institution<S: InstitutionStore>(
        &self,
        store: &S,
        caller: &Principal,
        name: &str,
        now: Height,
    ) -> Result<InstitutionRecord, LedgerError> {
        if store.institution_exists(caller).map_err(storage)? {
            return Err(LedgerError::AlreadyRegistered);
        }
        let len = char_len(name);
        if len == 0 || len > MAX_INSTITUTION_NAME_LEN {
            return Err(LedgerError::InvalidName);
        }
        let record = InstitutionRecord {
            principal: caller.clone(),
            name: name.to_string(),
            registered_at: now,
            active: true,
        };
        store.put_institution(&record).map_err(storage)?;
        tracing::info!(institution = %caller, name, height = %now, "institution registered");
        Ok(record)
    }

    pub fn get_user<S: UserStore>(
        &self,
        store: &S,
        principal: &Principal,
    ) -> Result<Option<UserRecord>, LedgerError> {
        store.get_user(principal).map_err(storage)
    }

    pub fn get_institution<S: InstitutionStore>(
        &self,
        store: &S,
        principal: &Principal,
    ) -> Result<Option<InstitutionRecord>, LedgerError> {
        store.get_institution(principal).map_err(storage)
    }

    /// Whether `principal` holds an active institution record.
    pub fn is_active_institution<S: InstitutionStore>(
        &self,
        store: &S,
        principal: &Principal,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .get_institution(store, principal)?
            .is_some_and(|i| i.active))
    }
}

fn storage(e: StoreError) -> LedgerError {
    LedgerError::Storage(e.to_string())
}
