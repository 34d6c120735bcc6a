//! Proof lifecycle engine.
//!
//! Every external call enters [`LifecycleEngine`], which validates the input,
//! consults the registry, governance and proof store, mutates state, and for
//! submissions asks the host to move the verification fee.
//!
//! ```text
//! Submitted ──verify──▶ Verified ──revoke──▶ Revoked
//!     │
//!     └──reject──▶ Rejected
//! ```
//!
//! Calls are synchronous and serialized by the host. A call either applies all
//! of its effects or none of them.

pub mod context;
pub mod engine;
pub mod events;
pub mod snapshot;
pub mod validation;

pub use context::CallContext;
pub use engine::LifecycleEngine;
pub use events::LedgerEvent;
pub use snapshot::{LedgerSnapshot, SnapshotError};
pub use validation::ProofSubmission;
