//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the ledger (height source, storage, fee
//! transfers) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or a real payment layer
//!
//! Usage: swap host implementations for nullables in tests and local replays.

pub mod clock;
pub mod store;
pub mod transfer;

pub use clock::NullHeight;
pub use store::NullStore;
pub use transfer::NullTransferSink;
