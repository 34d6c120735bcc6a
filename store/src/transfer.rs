//! Fee transfer interface.
//!
//! The ledger decides that a fee must move; the host's payment layer moves it.

use credence_types::{FeeAmount, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fee transfer the ledger asks the host to perform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTransfer {
    pub amount: FeeAmount,
    pub from: Principal,
    pub to: Principal,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("transfer refused: {0}")]
    Refused(String),

    #[error("transfer {0} cannot be reverted")]
    NotReversible(String),
}

/// Host capability that executes fee transfers.
pub trait TransferSink {
    /// Perform `transfer`. An error means no funds moved.
    fn request_transfer(&self, transfer: &FeeTransfer) -> Result<(), TransferError>;

    /// Undo a transfer previously accepted by [`TransferSink::request_transfer`].
    ///
    /// Called only when the ledger could not persist the submission that the
    /// transfer paid for.
    fn revert_transfer(&self, transfer: &FeeTransfer) -> Result<(), TransferError>;
}
