//! Per-call environment supplied by the host.

use credence_types::{Height, Principal};
use serde::{Deserialize, Serialize};

/// The calling principal and current height of a single call.
///
/// Neither value comes from the call's own parameters: the host ledger
/// authenticates the caller and supplies the height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Principal,
    pub height: Height,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, height: impl Into<Height>) -> Self {
        Self {
            caller: caller.into(),
            height: height.into(),
        }
    }
}
