//! Abstract host interfaces for the Credence ledger.
//!
//! Every storage backend (in-memory for testing, a host ledger's key-value maps
//! in production) implements the storage traits; the host's payment layer
//! implements [`TransferSink`]. The rest of the codebase depends only on the
//! traits.

pub mod error;
pub mod institution;
pub mod proof;
pub mod transfer;
pub mod user;

pub use error::StoreError;
pub use institution::{InstitutionRecord, InstitutionStore};
pub use proof::{ProofRecord, ProofStore};
pub use transfer::{FeeTransfer, TransferError, TransferSink};
pub use user::{UserRecord, UserStore};

/// Everything the lifecycle engine needs from a storage backend.
pub trait LedgerStore: UserStore + InstitutionStore + ProofStore {}

impl<T: UserStore + InstitutionStore + ProofStore> LedgerStore for T {}
