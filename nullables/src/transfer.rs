//! Nullable transfer sink: record fee transfers without moving real funds.

use credence_store::{FeeTransfer, TransferError, TransferSink};
use credence_types::Principal;
use std::collections::HashMap;
use std::sync::Mutex;

/// A test sink that records every accepted fee transfer.
///
/// By default every transfer is accepted. Balances can be seeded to make the
/// sink refuse transfers the payer cannot afford, and [`NullTransferSink::refuse_all`]
/// simulates a host that rejects every payment.
pub struct NullTransferSink {
    transfers: Mutex<Vec<FeeTransfer>>,
    balances: Mutex<Option<HashMap<Principal, u128>>>,
    refusal: Mutex<Option<String>>,
}

impl NullTransferSink {
    pub fn new() -> Self {
        Self {
            transfers: Mutex::new(Vec::new()),
            balances: Mutex::new(None),
            refusal: Mutex::new(None),
        }
    }

    /// Create a sink that enforces the given starting balances.
    /// Principals missing from the map have a balance of zero.
    pub fn with_balances(balances: impl IntoIterator<Item = (Principal, u128)>) -> Self {
        let sink = Self::new();
        *sink.balances.lock().unwrap() = Some(balances.into_iter().collect());
        sink
    }

    /// Refuse every subsequent transfer with `reason`.
    pub fn refuse_all(&self, reason: impl Into<String>) {
        *self.refusal.lock().unwrap() = Some(reason.into());
    }

    /// Accept transfers again after [`NullTransferSink::refuse_all`].
    pub fn accept_all(&self) {
        *self.refusal.lock().unwrap() = None;
    }

    /// All transfers accepted and not reverted, in order.
    pub fn transfers(&self) -> Vec<FeeTransfer> {
        self.transfers.lock().unwrap().clone()
    }

    /// Current balance of `principal`, if balances are enforced.
    pub fn balance(&self, principal: &Principal) -> Option<u128> {
        self.balances
            .lock()
            .unwrap()
            .as_ref()
            .map(|b| b.get(principal).copied().unwrap_or(0))
    }
}

impl Default for NullTransferSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferSink for NullTransferSink {
    fn request_transfer(&self, transfer: &FeeTransfer) -> Result<(), TransferError> {
        if let Some(reason) = self.refusal.lock().unwrap().as_ref() {
            return Err(TransferError::Refused(reason.clone()));
        }
        if let Some(balances) = self.balances.lock().unwrap().as_mut() {
            let amount = transfer.amount.raw();
            let available = balances.get(&transfer.from).copied().unwrap_or(0);
            if available < amount {
                return Err(TransferError::InsufficientFunds {
                    needed: amount,
                    available,
                });
            }
            balances.insert(transfer.from.clone(), available - amount);
            *balances.entry(transfer.to.clone()).or_insert(0) += amount;
        }
        self.transfers.lock().unwrap().push(transfer.clone());
        Ok(())
    }

    fn revert_transfer(&self, transfer: &FeeTransfer) -> Result<(), TransferError> {
        let mut transfers = self.transfers.lock().unwrap();
        let pos = transfers
            .iter()
            .rposition(|t| t == transfer)
            .ok_or_else(|| TransferError::NotReversible(format!("{:?}", transfer)))?;
        transfers.remove(pos);
        if let Some(balances) = self.balances.lock().unwrap().as_mut() {
            let amount = transfer.amount.raw();
            if let Some(to) = balances.get_mut(&transfer.to) {
                *to = to.saturating_sub(amount);
            }
            *balances.entry(transfer.from.clone()).or_insert(0) += amount;
        }
        Ok(())
    }
}
