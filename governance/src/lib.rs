//! Governance for the Credence ledger.
//!
//! A single authority principal is set exactly once. While it is set, the
//! governable parameters (the per-user proof quota and the verification fee)
//! can be changed. The authority also receives every verification fee.

pub mod engine;
pub mod params;

pub use engine::{Governance, GovernanceConfig, GovernanceSnapshot};
pub use params::GovernableParam;
