//! User and institution registry.
//!
//! Registration is one-shot per principal and role: a principal may hold one
//! user record and one institution record, each created once and never
//! deleted. The registry is stateless; records live in the injected store.

pub mod registry;

pub use registry::Registry;
