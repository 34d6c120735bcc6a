//! The Credence node: one lifecycle engine behind one lock.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use credence_governance::Governance;
use credence_ledger::{CallContext, LedgerEvent, LedgerSnapshot, LifecycleEngine, ProofSubmission};
use credence_nullables::{NullStore, NullTransferSink};
use credence_store::{LedgerStore, TransferSink};
use credence_types::{FeeAmount, Height, LedgerError, ProofId};

use crate::call::{CallEnvelope, CallOutcome, LedgerCall};
use crate::config::NodeConfig;
use crate::error::NodeError;

struct NodeState<S, T> {
    engine: LifecycleEngine<S, T>,
    /// Highest height seen so far; calls may not go below it.
    height: Height,
}

/// Hosts a [`LifecycleEngine`] and serializes every call through one mutex.
///
/// The node also enforces that host heights never go backwards, which the
/// engine itself takes on trust.
pub struct LedgerNode<S = NullStore, T = NullTransferSink> {
    state: Mutex<NodeState<S, T>>,
}

impl LedgerNode<NullStore, NullTransferSink> {
    /// A node backed by in-memory storage and a recording transfer sink.
    pub fn in_memory(config: &NodeConfig) -> Result<Self, NodeError> {
        Self::new(NullStore::new(), NullTransferSink::new(), config)
    }
}

impl<S: LedgerStore, T: TransferSink> LedgerNode<S, T> {
    /// Build a node on a fresh store.
    ///
    /// If the config names an authority it is installed at height zero.
    pub fn new(store: S, sink: T, config: &NodeConfig) -> Result<Self, NodeError> {
        let governance = Governance::new(config.ledger_params(), config.governance_config());
        let mut engine = LifecycleEngine::new(store, sink, governance);
        if let Some(authority) = &config.authority {
            let ctx = CallContext::new(authority.clone(), Height::GENESIS);
            engine.set_authority(&ctx, authority.clone())?;
        }
        tracing::info!(
            max_proofs_per_user = config.max_proofs_per_user,
            verification_fee = config.verification_fee,
            authority = config.authority.as_ref().map(|a| a.as_str()),
            "ledger node started"
        );
        Ok(Self::from_engine(engine, Height::GENESIS))
    }

    /// Rebuild a node from a snapshot on top of an empty store.
    pub fn from_snapshot(
        snapshot: &LedgerSnapshot,
        store: S,
        sink: T,
        config: &NodeConfig,
    ) -> Result<Self, NodeError> {
        let engine = snapshot.restore(store, sink, config.governance_config())?;
        Ok(Self::from_engine(engine, snapshot.height))
    }

    fn from_engine(engine: LifecycleEngine<S, T>, height: Height) -> Self {
        Self {
            state: Mutex::new(NodeState { engine, height }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, NodeState<S, T>>, NodeError> {
        self.state.lock().map_err(|_| NodeError::LockPoisoned)
    }

    /// Execute one call.
    ///
    /// Ledger failures come back as [`CallOutcome::Error`]. A `NodeError` means
    /// the call never reached the engine (or its result could not be encoded).
    pub fn dispatch(&self, envelope: &CallEnvelope) -> Result<CallOutcome, NodeError> {
        let mut state = self.lock()?;
        let height = Height::new(envelope.height);
        if height < state.height {
            return Err(NodeError::HeightRegression {
                last: state.height,
                got: height,
            });
        }
        state.height = height;

        let ctx = CallContext::new(envelope.caller.clone(), height);
        let outcome = match execute(&mut state.engine, &ctx, &envelope.call) {
            Ok(value) => CallOutcome::Ok(value),
            Err(Rejection::Ledger(e)) => CallOutcome::from(e),
            Err(Rejection::Encode(e)) => return Err(NodeError::Codec(e.to_string())),
        };
        tracing::debug!(
            op = envelope.call.name(),
            caller = %envelope.caller,
            height = %height,
            ok = outcome.is_ok(),
            "call dispatched"
        );
        Ok(outcome)
    }

    /// Highest height seen by this node.
    pub fn height(&self) -> Result<Height, NodeError> {
        Ok(self.lock()?.height)
    }

    pub fn drain_events(&self) -> Result<Vec<LedgerEvent>, NodeError> {
        Ok(self.lock()?.engine.drain_events())
    }

    /// Run `f` against the engine while holding the node lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&LifecycleEngine<S, T>) -> R) -> Result<R, NodeError> {
        Ok(f(&self.lock()?.engine))
    }

    /// Capture the ledger at the node's current height.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, NodeError> {
        let state = self.lock()?;
        Ok(LedgerSnapshot::capture(&state.engine, state.height)?)
    }

    /// Write a bincode snapshot to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<LedgerSnapshot, NodeError> {
        let snapshot = self.snapshot()?;
        std::fs::write(path.as_ref(), snapshot.to_bytes()?)?;
        tracing::info!(path = %path.as_ref().display(), proofs = snapshot.proof_count(), "snapshot written");
        Ok(snapshot)
    }
}

/// Read and verify a bincode snapshot from `path`.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<LedgerSnapshot, NodeError> {
    let bytes = std::fs::read(path.as_ref())?;
    let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
    if !snapshot.verify() {
        return Err(credence_ledger::SnapshotError::DigestMismatch.into());
    }
    Ok(snapshot)
}

enum Rejection {
    Ledger(LedgerError),
    Encode(serde_json::Error),
}

impl From<LedgerError> for Rejection {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

fn json<V: Serialize>(value: V) -> Result<serde_json::Value, Rejection> {
    serde_json::to_value(value).map_err(Rejection::Encode)
}

fn execute<S: LedgerStore, T: TransferSink>(
    engine: &mut LifecycleEngine<S, T>,
    ctx: &CallContext,
    call: &LedgerCall,
) -> Result<serde_json::Value, Rejection> {
    let done = serde_json::Value::Bool(true);
    match call {
        LedgerCall::SetAuthority { authority } => {
            engine.set_authority(ctx, authority.clone())?;
            Ok(done)
        }
        LedgerCall::SetMaxProofsPerUser { max } => {
            engine.set_max_proofs_per_user(ctx, *max)?;
            Ok(done)
        }
        LedgerCall::SetVerificationFee { fee } => {
            engine.set_verification_fee(ctx, FeeAmount::new(u128::from(*fee)))?;
            Ok(done)
        }
        LedgerCall::RegisterInstitution { name } => {
            engine.register_institution(ctx, name)?;
            Ok(done)
        }
        LedgerCall::RegisterUser => {
            engine.register_user(ctx)?;
            Ok(done)
        }
        LedgerCall::SubmitProof {
            proof_hash,
            credential_type,
            metadata,
            expiry,
            verification_level,
        } => {
            let id = engine.submit_proof(
                ctx,
                ProofSubmission {
                    proof_hash,
                    credential_type,
                    metadata,
                    expiry: Height::new(*expiry),
                    verification_level: *verification_level,
                },
            )?;
            json(id)
        }
        LedgerCall::VerifyProof { id, signature } => {
            engine.verify_proof(ctx, ProofId::new(*id), signature)?;
            Ok(done)
        }
        LedgerCall::RejectProof { id } => {
            engine.reject_proof(ctx, ProofId::new(*id))?;
            Ok(done)
        }
        LedgerCall::RevokeProof { id, reason } => {
            engine.revoke_proof(ctx, ProofId::new(*id), reason)?;
            Ok(done)
        }
        LedgerCall::GetProof { id } => json(engine.get_proof(ProofId::new(*id))?),
        LedgerCall::IsProofVerified { id } => json(engine.is_proof_verified(ctx, ProofId::new(*id))?),
        LedgerCall::ProofState { id } => {
            json(engine.proof_state(ProofId::new(*id))?.map(|s| s.as_str()))
        }
    }
}
