//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use credence_governance::GovernanceConfig;
use credence_types::{FeeAmount, LedgerParams, Principal};
use credence_utils::LogFormat;

use crate::NodeError;

/// Configuration for a Credence node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Per-user proof quota at startup.
    #[serde(default = "default_max_proofs_per_user")]
    pub max_proofs_per_user: u64,

    /// Fee charged per submission at startup, in the host's smallest unit.
    #[serde(default = "default_verification_fee")]
    pub verification_fee: u64,

    /// Governance authority installed when the node starts.
    /// Left unset, the first `set_authority` call decides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<Principal>,

    /// Only the authority may change parameters.
    #[serde(default)]
    pub restrict_governance_to_authority: bool,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_max_proofs_per_user() -> u64 {
    LedgerParams::DEFAULT_MAX_PROOFS_PER_USER
}

fn default_verification_fee() -> u64 {
    LedgerParams::DEFAULT_VERIFICATION_FEE as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject values the ledger could never start with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.max_proofs_per_user == 0 {
            return Err(NodeError::Config("max_proofs_per_user must be positive".into()));
        }
        if let Some(authority) = &self.authority {
            if !authority.is_valid() {
                return Err(NodeError::Config(format!("invalid authority principal `{authority}`")));
            }
        }
        Ok(())
    }

    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams {
            max_proofs_per_user: self.max_proofs_per_user,
            verification_fee: FeeAmount::new(u128::from(self.verification_fee)),
        }
    }

    pub fn governance_config(&self) -> GovernanceConfig {
        GovernanceConfig {
            restrict_to_authority: self.restrict_governance_to_authority,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            max_proofs_per_user: default_max_proofs_per_user(),
            verification_fee: default_verification_fee(),
            authority: None,
            restrict_governance_to_authority: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
