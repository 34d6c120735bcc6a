//! Credence node: hosts the lifecycle engine for a single process.
//!
//! The node is the piece a host embeds:
//! - Loads [`NodeConfig`] from TOML
//! - Serializes every call through one lock and rejects regressing heights
//! - Decodes [`CallEnvelope`]s and encodes [`CallOutcome`]s as JSON
//! - Saves and restores bincode snapshots

pub mod call;
pub mod config;
pub mod error;
pub mod node;

pub use call::{CallEnvelope, CallOutcome, LedgerCall};
pub use config::NodeConfig;
pub use error::NodeError;
pub use node::{load_snapshot, LedgerNode};
