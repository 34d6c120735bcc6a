//! Governance state: the authority and the governable parameters.

use crate::params::GovernableParam;
use credence_types::{FeeAmount, LedgerError, LedgerParams, Principal};
use serde::{Deserialize, Serialize};

/// Static governance behaviour, fixed when the ledger is created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// When true, only the authority itself may change parameters.
    /// When false (the deployed contract's behaviour), any caller may change
    /// them once an authority exists.
    #[serde(default)]
    pub restrict_to_authority: bool,
}

/// Serializable copy of the governance state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub authority: Option<Principal>,
    pub params: LedgerParams,
}

/// Owns the authority and the governable parameters.
///
/// The authority has exactly one legal transition: from unset to set.
#[derive(Clone, Debug)]
pub struct Governance {
    authority: Option<Principal>,
    params: LedgerParams,
    config: GovernanceConfig,
}

impl Default for Governance {
    fn default() -> Self {
        Self::new(LedgerParams::default(), GovernanceConfig::default())
    }
}

impl Governance {
    pub fn new(params: LedgerParams, config: GovernanceConfig) -> Self {
        Self {
            authority: None,
            params,
            config,
        }
    }

    /// Rebuild governance from a snapshot.
    pub fn from_snapshot(snapshot: GovernanceSnapshot, config: GovernanceConfig) -> Self {
        Self {
            authority: snapshot.authority,
            params: snapshot.params,
            config,
        }
    }

    pub fn snapshot(&self) -> GovernanceSnapshot {
        GovernanceSnapshot {
            authority: self.authority.clone(),
            params: self.params.clone(),
        }
    }

    /// Set the authority. Succeeds only once.
    pub fn set_authority(&mut self, principal: Principal) -> Result<(), LedgerError> {
        if self.authority.is_some() {
            return Err(LedgerError::AuthorityAlreadySet);
        }
        tracing::info!(authority = %principal, "governance authority set");
        self.authority = Some(principal);
        Ok(())
    }

    /// Change the per-user proof quota. Zero is rejected.
    pub fn set_max_proofs_per_user(
        &mut self,
        caller: &Principal,
        max: u64,
    ) -> Result<(), LedgerError> {
        self.check_caller(caller)?;
        if max == 0 {
            return Err(LedgerError::InvalidParameter);
        }
        self.params.max_proofs_per_user = max;
        tracing::info!(
            param = GovernableParam::MaxProofsPerUser.name(),
            value = max,
            "governance parameter changed"
        );
        Ok(())
    }

    /// Change the verification fee. Zero is allowed.
    pub fn set_verification_fee(
        &mut self,
        caller: &Principal,
        fee: FeeAmount,
    ) -> Result<(), LedgerError> {
        self.check_caller(caller)?;
        self.params.verification_fee = fee;
        tracing::info!(
            param = GovernableParam::VerificationFee.name(),
            value = %fee,
            "governance parameter changed"
        );
        Ok(())
    }

    /// The authority, or `AuthorityNotSet`.
    pub fn require_authority(&self) -> Result<&Principal, LedgerError> {
        self.authority.as_ref().ok_or(LedgerError::AuthorityNotSet)
    }

    pub fn authority(&self) -> Option<&Principal> {
        self.authority.as_ref()
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn max_proofs_per_user(&self) -> u64 {
        self.params.max_proofs_per_user
    }

    pub fn verification_fee(&self) -> FeeAmount {
        self.params.verification_fee
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    fn check_caller(&self, caller: &Principal) -> Result<(), LedgerError> {
        let authority = self.require_authority()?;
        if self.config.restrict_to_authority && authority != caller {
            return Err(LedgerError::NotAuthorized);
        }
        Ok(())
    }
}
