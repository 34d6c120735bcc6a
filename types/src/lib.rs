//! Fundamental types for the Credence credential ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! principals, heights, proof hashes, signatures, fee amounts, ledger parameters,
//! the proof lifecycle states, and the flat error taxonomy.

pub mod amount;
pub mod error;
pub mod hash;
pub mod height;
pub mod id;
pub mod params;
pub mod principal;
pub mod signature;
pub mod state;

pub use amount::FeeAmount;
pub use error::{ErrorCategory, LedgerError};
pub use hash::ProofHash;
pub use height::Height;
pub use id::ProofId;
pub use params::LedgerParams;
pub use principal::Principal;
pub use signature::InstitutionSignature;
pub use state::ProofState;
