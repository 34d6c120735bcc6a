use credence_types::Height;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] credence_types::LedgerError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] credence_ledger::SnapshotError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("height regressed from {last} to {got}")]
    HeightRegression { last: Height, got: Height },

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
