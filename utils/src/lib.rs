//! Shared utilities for Credence binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat, ParseLogFormatError};
