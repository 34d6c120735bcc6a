//! The lifecycle engine: one instance owns all ledger state.

use crate::context::CallContext;
use crate::events::LedgerEvent;
use crate::validation::{check_revocation_reason, parse_signature, ProofSubmission};
use credence_governance::{GovernableParam, Governance};
use credence_registry::Registry;
use credence_store::{
    FeeTransfer, InstitutionRecord, LedgerStore, ProofRecord, StoreError, TransferSink,
    UserRecord,
};
use credence_types::{FeeAmount, LedgerError, Principal, ProofHash, ProofId, ProofState};

/// Drives proofs through `Submitted → {Verified, Rejected}` and
/// `Verified → Revoked`.
///
/// The engine is generic over its storage backend and fee-transfer sink so
/// that isolated instances can be built for tests or replays. All mutating
/// entry points take `&mut self`: calls are serialized by construction.
pub struct LifecycleEngine<S, T> {
    store: S,
    sink: T,
    governance: Governance,
    registry: Registry,
    /// Events from successful calls, waiting for the host to drain them.
    pending_events: Vec<LedgerEvent>,
}

impl<S: LedgerStore, T: TransferSink> LifecycleEngine<S, T> {
    pub fn new(store: S, sink: T, governance: Governance) -> Self {
        Self {
            store,
            sink,
            governance,
            registry: Registry,
            pending_events: Vec::new(),
        }
    }

    // ── Governance ──────────────────────────────────────────────────────

    /// Set the governance authority. Only the first call succeeds.
    pub fn set_authority(
        &mut self,
        ctx: &CallContext,
        authority: Principal,
    ) -> Result<(), LedgerError> {
        let result = self.governance.set_authority(authority.clone());
        self.finish(ctx, "set_authority", result, || LedgerEvent::AuthoritySet {
            authority,
        })
    }

    pub fn set_max_proofs_per_user(
        &mut self,
        ctx: &CallContext,
        max: u64,
    ) -> Result<(), LedgerError> {
        let result = self.governance.set_max_proofs_per_user(&ctx.caller, max);
        self.finish(ctx, "set_max_proofs_per_user", result, || {
            LedgerEvent::ParameterChanged {
                param: GovernableParam::MaxProofsPerUser,
                value: u128::from(max),
            }
        })
    }

    pub fn set_verification_fee(
        &mut self,
        ctx: &CallContext,
        fee: FeeAmount,
    ) -> Result<(), LedgerError> {
        let result = self.governance.set_verification_fee(&ctx.caller, fee);
        self.finish(ctx, "set_verification_fee", result, || {
            LedgerEvent::ParameterChanged {
                param: GovernableParam::VerificationFee,
                value: fee.raw(),
            }
        })
    }

    // ── Registry ────────────────────────────────────────────────────────

    pub fn register_user(&mut self, ctx: &CallContext) -> Result<(), LedgerError> {
        let result = self
            .registry
            .register_user(&self.store, &ctx.caller, ctx.height)
            .map(|_| ());
        self.finish(ctx, "register_user", result, || LedgerEvent::UserRegistered {
            user: ctx.caller.clone(),
            height: ctx.height,
        })
    }

    pub fn register_institution(
        &mut self,
        ctx: &CallContext,
        name: &str,
    ) -> Result<(), LedgerError> {
        let result = self
            .registry
            .register_institution(&self.store, &ctx.caller, name, ctx.height)
            .map(|_| ());
        self.finish(ctx, "register_institution", result, || {
            LedgerEvent::InstitutionRegistered {
                institution: ctx.caller.clone(),
                name: name.to_string(),
                height: ctx.height,
            }
        })
    }

    // ── Proof lifecycle ─────────────────────────────────────────────────

    /// Submit a new proof and charge the verification fee.
    ///
    /// Returns the assigned id. On any failure, including a refused fee
    /// transfer, no proof is stored, no id is consumed and the user's proof
    /// count is unchanged.
    pub fn submit_proof(
        &mut self,
        ctx: &CallContext,
        submission: ProofSubmission<'_>,
    ) -> Result<ProofId, LedgerError> {
        let result = self.try_submit(ctx, &submission);
        match result {
            Ok((id, event)) => {
                tracing::info!(
                    id = %id,
                    owner = %ctx.caller,
                    height = %ctx.height,
                    "proof submitted"
                );
                self.pending_events.push(event);
                Ok(id)
            }
            Err(e) => Err(self.rejected_call(ctx, "submit_proof", e)),
        }
    }

    /// Verify a submitted proof as the calling institution.
    pub fn verify_proof(
        &mut self,
        ctx: &CallContext,
        id: ProofId,
        signature: &[u8],
    ) -> Result<(), LedgerError> {
        let result = self.try_verify(ctx, id, signature);
        self.finish(ctx, "verify_proof", result, || LedgerEvent::ProofVerified {
            id,
            institution: ctx.caller.clone(),
            height: ctx.height,
        })
    }

    /// Reject a submitted proof as the calling institution.
    ///
    /// Unlike verification, rejection is allowed after the proof's expiry.
    pub fn reject_proof(&mut self, ctx: &CallContext, id: ProofId) -> Result<(), LedgerError> {
        let result = self.try_reject(ctx, id);
        self.finish(ctx, "reject_proof", result, || LedgerEvent::ProofRejected {
            id,
            institution: ctx.caller.clone(),
            height: ctx.height,
        })
    }

    /// Revoke a verified proof as its owner.
    pub fn revoke_proof(
        &mut self,
        ctx: &CallContext,
        id: ProofId,
        reason: &str,
    ) -> Result<(), LedgerError> {
        let result = self.try_revoke(ctx, id, reason);
        self.finish(ctx, "revoke_proof", result, || LedgerEvent::ProofRevoked {
            id,
            owner: ctx.caller.clone(),
            reason: reason.to_string(),
            height: ctx.height,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_proof(&self, id: ProofId) -> Result<Option<ProofRecord>, LedgerError> {
        self.store.get_proof(id).map_err(storage)
    }

    pub fn get_proof_by_hash(&self, hash: &ProofHash) -> Result<Option<ProofRecord>, LedgerError> {
        self.store.get_proof_by_hash(hash).map_err(storage)
    }

    /// Whether proof `id` is a currently valid credential at `ctx.height`.
    ///
    /// False for unknown ids. Never cached: validity lapses as height passes
    /// the expiry without any stored field changing.
    pub fn is_proof_verified(&self, ctx: &CallContext, id: ProofId) -> Result<bool, LedgerError> {
        Ok(self
            .get_proof(id)?
            .is_some_and(|p| p.is_verified_at(ctx.height)))
    }

    /// Lifecycle state of proof `id`, or `None` if it does not exist.
    pub fn proof_state(&self, id: ProofId) -> Result<Option<ProofState>, LedgerError> {
        Ok(self.get_proof(id)?.and_then(|p| p.state()))
    }

    pub fn get_user(&self, principal: &Principal) -> Result<Option<UserRecord>, LedgerError> {
        self.registry.get_user(&self.store, principal)
    }

    pub fn get_institution(
        &self,
        principal: &Principal,
    ) -> Result<Option<InstitutionRecord>, LedgerError> {
        self.registry.get_institution(&self.store, principal)
    }

    pub fn governance(&self) -> &Governance {
        &self.governance
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &T {
        &self.sink
    }

    /// Take all events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn into_parts(self) -> (S, T, Governance) {
        (self.store, self.sink, self.governance)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn try_submit(
        &mut self,
        ctx: &CallContext,
        submission: &ProofSubmission<'_>,
    ) -> Result<(ProofId, LedgerEvent), LedgerError> {
        let proof_hash = submission.validate(ctx.height)?;

        if self.store.hash_exists(&proof_hash).map_err(storage)? {
            return Err(LedgerError::ProofAlreadyExists);
        }
        let user = self
            .registry
            .get_user(&self.store, &ctx.caller)?
            .ok_or(LedgerError::UserNotRegistered)?;
        if user.proof_count >= self.governance.max_proofs_per_user() {
            return Err(LedgerError::MaxProofsExceeded);
        }
        let authority = self.governance.require_authority()?.clone();

        let transfer = FeeTransfer {
            amount: self.governance.verification_fee(),
            from: ctx.caller.clone(),
            to: authority.clone(),
        };
        self.sink
            .request_transfer(&transfer)
            .map_err(|e| LedgerError::TransferFailed(e.to_string()))?;

        let id = match self.persist_submission(ctx, user, proof_hash, submission) {
            Ok(id) => id,
            Err(e) => {
                if let Err(revert) = self.sink.revert_transfer(&transfer) {
                    tracing::error!(
                        error = %revert,
                        from = %transfer.from,
                        amount = %transfer.amount,
                        "fee transfer could not be reverted after failed submission"
                    );
                }
                return Err(e);
            }
        };

        Ok((
            id,
            LedgerEvent::ProofSubmitted {
                id,
                owner: ctx.caller.clone(),
                proof_hash,
                fee: transfer.amount,
                authority,
            },
        ))
    }

    /// Store the proof and bump the owner's count in one store commit. Every
    /// domain check has already passed; only a backend failure can stop this,
    /// and then nothing is written.
    fn persist_submission(
        &self,
        ctx: &CallContext,
        mut user: UserRecord,
        proof_hash: ProofHash,
        submission: &ProofSubmission<'_>,
    ) -> Result<ProofId, LedgerError> {
        let record = ProofRecord {
            // Assigned by the store on commit.
            id: ProofId::FIRST,
            owner: ctx.caller.clone(),
            proof_hash,
            credential_type: submission.credential_type.to_string(),
            metadata: submission.metadata.to_string(),
            submitted_at: ctx.height,
            expiry: submission.expiry,
            verification_level: submission.verification_level,
            verified: false,
            rejected: false,
            institution: None,
            signature: None,
            revoked: false,
            revocation_reason: None,
            revoked_at: None,
        };
        user.proof_count += 1;
        self.store
            .commit_submission(record, &user)
            .map_err(|e| match e {
                StoreError::Duplicate(_) => LedgerError::ProofAlreadyExists,
                other => storage(other),
            })
    }

    fn try_verify(
        &mut self,
        ctx: &CallContext,
        id: ProofId,
        signature: &[u8],
    ) -> Result<(), LedgerError> {
        let proof = self.load_proof(id)?;
        self.require_active_institution(&ctx.caller)?;
        let signature = parse_signature(signature)?;
        if proof.verified {
            return Err(LedgerError::AlreadyVerified);
        }
        if proof.rejected {
            return Err(LedgerError::ProofRejected);
        }
        if proof.expiry.is_reached_at(ctx.height) {
            return Err(LedgerError::ProofExpired);
        }
        let institution = ctx.caller.clone();
        self.store
            .update_proof(id, |p| {
                p.verified = true;
                p.institution = Some(institution);
                p.signature = Some(signature);
            })
            .map_err(storage)?;
        Ok(())
    }

    fn try_reject(&mut self, ctx: &CallContext, id: ProofId) -> Result<(), LedgerError> {
        let proof = self.load_proof(id)?;
        self.require_active_institution(&ctx.caller)?;
        if proof.verified {
            return Err(LedgerError::AlreadyVerified);
        }
        if proof.rejected {
            return Err(LedgerError::ProofRejected);
        }
        self.store
            .update_proof(id, |p| p.rejected = true)
            .map_err(storage)?;
        Ok(())
    }

    fn try_revoke(
        &mut self,
        ctx: &CallContext,
        id: ProofId,
        reason: &str,
    ) -> Result<(), LedgerError> {
        let proof = self.load_proof(id)?;
        if proof.owner != ctx.caller {
            return Err(LedgerError::RevocationNotAllowed);
        }
        check_revocation_reason(reason)?;
        if !proof.verified {
            return Err(LedgerError::ProofNotEligibleForRevocation);
        }
        if proof.revoked {
            return Err(LedgerError::ProofAlreadyRevoked);
        }
        let height = ctx.height;
        self.store
            .update_proof(id, |p| {
                p.revoked = true;
                p.revocation_reason = Some(reason.to_string());
                p.revoked_at = Some(height);
            })
            .map_err(storage)?;
        Ok(())
    }

    fn load_proof(&self, id: ProofId) -> Result<ProofRecord, LedgerError> {
        self.get_proof(id)?.ok_or(LedgerError::ProofNotFound)
    }

    fn require_active_institution(&self, caller: &Principal) -> Result<(), LedgerError> {
        if self.registry.is_active_institution(&self.store, caller)? {
            Ok(())
        } else {
            Err(LedgerError::InstitutionNotRegistered)
        }
    }

    /// Record the event of a successful call, or log a rejected one.
    fn finish(
        &mut self,
        ctx: &CallContext,
        op: &'static str,
        result: Result<(), LedgerError>,
        event: impl FnOnce() -> LedgerEvent,
    ) -> Result<(), LedgerError> {
        match result {
            Ok(()) => {
                let event = event();
                tracing::debug!(op, caller = %ctx.caller, height = %ctx.height, topic = event.topic(), "call applied");
                self.pending_events.push(event);
                Ok(())
            }
            Err(e) => Err(self.rejected_call(ctx, op, e)),
        }
    }

    fn rejected_call(&self, ctx: &CallContext, op: &'static str, e: LedgerError) -> LedgerError {
        tracing::debug!(
            op,
            caller = %ctx.caller,
            height = %ctx.height,
            code = e.code(),
            error = %e,
            "call rejected"
        );
        e
    }
}

fn storage(e: StoreError) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_nullables::{NullStore, NullTransferSink};
    use credence_store::{InstitutionStore, ProofStore, UserStore};
    use credence_types::Height;

    const USER: &str = "ST1TEST";
    const AUTH: &str = "ST2AUTH";
    const INST: &str = "ST3INST";
    const OTHER: &str = "ST4OTHER";

    type Engine = LifecycleEngine<NullStore, NullTransferSink>;

    fn ctx(caller: &str, height: u64) -> CallContext {
        CallContext::new(caller, height)
    }

    fn hash(marker: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[0] = marker;
        bytes
    }

    fn submission(bytes: &[u8]) -> ProofSubmission<'_> {
        ProofSubmission {
            proof_hash: bytes,
            credential_type: "BSc",
            metadata: "Degree in CS",
            expiry: Height::new(100),
            verification_level: 3,
        }
    }

    fn engine() -> Engine {
        LifecycleEngine::new(NullStore::new(), NullTransferSink::new(), Governance::default())
    }

    /// Authority set, USER registered, INST registered.
    fn ready_engine() -> Engine {
        let mut e = engine();
        e.set_authority(&ctx(USER, 0), Principal::new(AUTH)).unwrap();
        e.register_user(&ctx(USER, 0)).unwrap();
        e.register_institution(&ctx(INST, 0), "UniversityX").unwrap();
        e
    }

    fn submitted_engine() -> Engine {
        let mut e = ready_engine();
        let bytes = hash(1);
        e.submit_proof(&ctx(USER, 0), submission(&bytes)).unwrap();
        e
    }

    fn verified_engine() -> Engine {
        let mut e = submitted_engine();
        e.verify_proof(&ctx(INST, 50), ProofId::new(0), &[2u8; 65])
            .unwrap();
        e
    }

    #[test]
    fn submit_order_hash_before_registration() {
        let mut e = engine();
        let short = [1u8; 31];
        assert_eq!(
            e.submit_proof(&ctx(USER, 0), submission(&short)),
            Err(LedgerError::InvalidProofHash)
        );
    }

    #[test]
    fn submit_requires_registered_user() {
        let mut e = engine();
        e.set_authority(&ctx(USER, 0), Principal::new(AUTH)).unwrap();
        let bytes = hash(1);
        assert_eq!(
            e.submit_proof(&ctx(USER, 0), submission(&bytes)),
            Err(LedgerError::UserNotRegistered)
        );
    }

    #[test]
    fn submit_checks_quota_before_authority() {
        let mut e = engine();
        e.register_user(&ctx(USER, 0)).unwrap();
        let bytes = hash(1);
        // No authority yet: the quota check passes, the authority check fails.
        assert_eq!(
            e.submit_proof(&ctx(USER, 0), submission(&bytes)),
            Err(LedgerError::AuthorityNotSet)
        );
        assert!(e.sink().transfers().is_empty());
        assert_eq!(e.store().peek_next_id().unwrap(), ProofId::new(0));
    }

    #[test]
    fn duplicate_hash_wins_over_unregistered_user() {
        let mut e = submitted_engine();
        let bytes = hash(1);
        assert_eq!(
            e.submit_proof(&ctx(OTHER, 0), submission(&bytes)),
            Err(LedgerError::ProofAlreadyExists)
        );
    }

    #[test]
    fn quota_is_enforced() {
        let mut e = ready_engine();
        e.set_max_proofs_per_user(&ctx(AUTH, 0), 2).unwrap();
        for marker in 1..=2 {
            let bytes = hash(marker);
            e.submit_proof(&ctx(USER, 0), submission(&bytes)).unwrap();
        }
        let bytes = hash(3);
        assert_eq!(
            e.submit_proof(&ctx(USER, 0), submission(&bytes)),
            Err(LedgerError::MaxProofsExceeded)
        );
        assert_eq!(e.get_user(&Principal::new(USER)).unwrap().unwrap().proof_count, 2);
    }

    #[test]
    fn refused_transfer_leaves_no_trace() {
        let mut e = ready_engine();
        e.sink().refuse_all("insufficient STX");
        let bytes = hash(1);
        let err = e.submit_proof(&ctx(USER, 0), submission(&bytes)).unwrap_err();
        assert!(matches!(err, LedgerError::TransferFailed(_)));
        assert_eq!(e.store().proof_count().unwrap(), 0);
        assert_eq!(e.store().peek_next_id().unwrap(), ProofId::new(0));
        assert_eq!(e.get_user(&Principal::new(USER)).unwrap().unwrap().proof_count, 0);

        e.sink().accept_all();
        assert_eq!(
            e.submit_proof(&ctx(USER, 0), submission(&bytes)),
            Ok(ProofId::new(0))
        );
    }

    fn assert_untouched(e: &Engine) {
        assert_eq!(e.store().proof_count().unwrap(), 0);
        assert_eq!(e.store().hash_index_len(), 0);
        assert_eq!(e.get_user(&Principal::new(USER)).unwrap().unwrap().proof_count, 0);
        assert!(e.sink().transfers().is_empty());
    }

    #[test]
    fn storage_failure_reverts_the_fee() {
        let mut e = ready_engine();
        e.store().set_fail_writes(true);
        let bytes = hash(1);
        let err = e.submit_proof(&ctx(USER, 0), submission(&bytes)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_untouched(&e);
        assert_eq!(e.store().peek_next_id().unwrap(), ProofId::new(0));

        e.store().set_fail_writes(false);
        assert_eq!(
            e.submit_proof(&ctx(USER, 0), submission(&bytes)),
            Ok(ProofId::new(0))
        );
    }

    #[test]
    fn exhausted_ids_store_nothing() {
        let mut e = ready_engine();
        e.store().set_next_id(ProofId::new(u64::MAX)).unwrap();
        let bytes = hash(1);
        let err = e.submit_proof(&ctx(USER, 0), submission(&bytes)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_untouched(&e);
        assert!(!e
            .drain_events()
            .iter()
            .any(|ev| matches!(ev, LedgerEvent::ProofSubmitted { .. })));
    }

    /// Delegates to [`NullStore`] but refuses every write except the
    /// submission commit and proof updates.
    struct CommitOnlyStore(NullStore);

    fn piecemeal() -> StoreError {
        StoreError::Backend("piecemeal write".into())
    }

    impl UserStore for CommitOnlyStore {
        fn get_user(&self, principal: &Principal) -> Result<Option<UserRecord>, StoreError> {
            self.0.get_user(principal)
        }
        fn put_user(&self, _: &UserRecord) -> Result<(), StoreError> {
            Err(piecemeal())
        }
        fn user_count(&self) -> Result<u64, StoreError> {
            self.0.user_count()
        }
        fn iter_users(&self) -> Result<Vec<UserRecord>, StoreError> {
            self.0.iter_users()
        }
    }

    impl InstitutionStore for CommitOnlyStore {
        fn get_institution(
            &self,
            principal: &Principal,
        ) -> Result<Option<InstitutionRecord>, StoreError> {
            self.0.get_institution(principal)
        }
        fn put_institution(&self, _: &InstitutionRecord) -> Result<(), StoreError> {
            Err(piecemeal())
        }
        fn institution_count(&self) -> Result<u64, StoreError> {
            self.0.institution_count()
        }
        fn iter_institutions(&self) -> Result<Vec<InstitutionRecord>, StoreError> {
            self.0.iter_institutions()
        }
    }

    impl ProofStore for CommitOnlyStore {
        fn next_id(&self) -> Result<ProofId, StoreError> {
            Err(piecemeal())
        }
        fn commit_submission(
            &self,
            proof: ProofRecord,
            owner: &UserRecord,
        ) -> Result<ProofId, StoreError> {
            self.0.commit_submission(proof, owner)
        }
        fn peek_next_id(&self) -> Result<ProofId, StoreError> {
            self.0.peek_next_id()
        }
        fn set_next_id(&self, _: ProofId) -> Result<(), StoreError> {
            Err(piecemeal())
        }
        fn insert_proof(&self, _: &ProofRecord) -> Result<(), StoreError> {
            Err(piecemeal())
        }
        fn get_proof(&self, id: ProofId) -> Result<Option<ProofRecord>, StoreError> {
            self.0.get_proof(id)
        }
        fn proof_id_by_hash(&self, hash: &ProofHash) -> Result<Option<ProofId>, StoreError> {
            self.0.proof_id_by_hash(hash)
        }
        fn update_proof<F>(&self, id: ProofId, mutate: F) -> Result<ProofRecord, StoreError>
        where
            F: FnOnce(&mut ProofRecord),
        {
            self.0.update_proof(id, mutate)
        }
        fn proof_count(&self) -> Result<u64, StoreError> {
            self.0.proof_count()
        }
        fn iter_proofs(&self) -> Result<Vec<ProofRecord>, StoreError> {
            self.0.iter_proofs()
        }
    }

    #[test]
    fn submission_is_a_single_store_commit() {
        let (store, sink, governance) = ready_engine().into_parts();
        let mut e = LifecycleEngine::new(CommitOnlyStore(store), sink, governance);

        for marker in 1..=2u8 {
            let bytes = hash(marker);
            assert_eq!(
                e.submit_proof(&ctx(USER, 0), submission(&bytes)),
                Ok(ProofId::new(u64::from(marker) - 1))
            );
        }
        let user = e.get_user(&Principal::new(USER)).unwrap().unwrap();
        assert_eq!(user.proof_count, 2);
        assert_eq!(e.store().proof_count().unwrap(), 2);
        assert_eq!(e.sink().transfers().len(), 2);

        // Piecemeal writes really are refused.
        assert!(matches!(
            e.register_user(&ctx(OTHER, 0)),
            Err(LedgerError::Storage(_))
        ));
    }

    #[test]
    fn verify_checks_institution_before_signature() {
        let mut e = submitted_engine();
        assert_eq!(
            e.verify_proof(&ctx(OTHER, 1), ProofId::new(0), &[2u8; 3]),
            Err(LedgerError::InstitutionNotRegistered)
        );
        assert_eq!(
            e.verify_proof(&ctx(INST, 1), ProofId::new(0), &[2u8; 64]),
            Err(LedgerError::InvalidSignature)
        );
    }

    #[test]
    fn verify_unknown_proof() {
        let mut e = ready_engine();
        assert_eq!(
            e.verify_proof(&ctx(OTHER, 1), ProofId::new(9), &[2u8; 65]),
            Err(LedgerError::ProofNotFound)
        );
    }

    #[test]
    fn verify_after_reject_and_reject_after_verify() {
        let mut e = submitted_engine();
        e.reject_proof(&ctx(INST, 1), ProofId::new(0)).unwrap();
        assert_eq!(
            e.verify_proof(&ctx(INST, 1), ProofId::new(0), &[2u8; 65]),
            Err(LedgerError::ProofRejected)
        );
        assert_eq!(
            e.reject_proof(&ctx(INST, 1), ProofId::new(0)),
            Err(LedgerError::ProofRejected)
        );

        let mut e = verified_engine();
        assert_eq!(
            e.reject_proof(&ctx(INST, 60), ProofId::new(0)),
            Err(LedgerError::AlreadyVerified)
        );
    }

    #[test]
    fn reject_is_not_expiry_gated() {
        let mut e = submitted_engine();
        assert_eq!(
            e.verify_proof(&ctx(INST, 500), ProofId::new(0), &[2u8; 65]),
            Err(LedgerError::ProofExpired)
        );
        e.reject_proof(&ctx(INST, 500), ProofId::new(0)).unwrap();
        assert_eq!(e.proof_state(ProofId::new(0)).unwrap(), Some(ProofState::Rejected));
    }

    #[test]
    fn revoke_order_owner_then_reason_then_eligibility() {
        let mut e = submitted_engine();
        let long = "r".repeat(101);
        assert_eq!(
            e.revoke_proof(&ctx(OTHER, 1), ProofId::new(0), &long),
            Err(LedgerError::RevocationNotAllowed)
        );
        assert_eq!(
            e.revoke_proof(&ctx(USER, 1), ProofId::new(0), &long),
            Err(LedgerError::InvalidRevocationReason)
        );
        assert_eq!(
            e.revoke_proof(&ctx(USER, 1), ProofId::new(0), "changed my mind"),
            Err(LedgerError::ProofNotEligibleForRevocation)
        );
    }

    #[test]
    fn revoke_is_one_shot() {
        let mut e = verified_engine();
        e.revoke_proof(&ctx(USER, 70), ProofId::new(0), "Invalid data")
            .unwrap();
        let proof = e.get_proof(ProofId::new(0)).unwrap().unwrap();
        assert!(proof.revoked);
        assert_eq!(proof.revocation_reason.as_deref(), Some("Invalid data"));
        assert_eq!(proof.revoked_at, Some(Height::new(70)));
        assert_eq!(
            e.revoke_proof(&ctx(USER, 71), ProofId::new(0), "again"),
            Err(LedgerError::ProofAlreadyRevoked)
        );
    }

    #[test]
    fn revoked_proof_is_not_verified() {
        let mut e = verified_engine();
        assert!(e.is_proof_verified(&ctx(OTHER, 60), ProofId::new(0)).unwrap());
        e.revoke_proof(&ctx(USER, 70), ProofId::new(0), "").unwrap();
        assert!(!e.is_proof_verified(&ctx(OTHER, 70), ProofId::new(0)).unwrap());
        assert_eq!(e.proof_state(ProofId::new(0)).unwrap(), Some(ProofState::Revoked));
    }

    #[test]
    fn unknown_proof_is_not_verified() {
        let e = ready_engine();
        assert!(!e.is_proof_verified(&ctx(OTHER, 0), ProofId::new(0)).unwrap());
        assert_eq!(e.proof_state(ProofId::new(0)).unwrap(), None);
    }

    #[test]
    fn events_follow_successful_calls_only() {
        let mut e = ready_engine();
        let setup = e.drain_events();
        assert_eq!(setup.len(), 3);
        assert_eq!(setup[0].topic(), "authority_set");

        let bytes = hash(1);
        e.submit_proof(&ctx(USER, 0), submission(&bytes)).unwrap();
        assert!(e.submit_proof(&ctx(USER, 0), submission(&bytes)).is_err());
        let events = e.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].proof_id(), Some(ProofId::new(0)));
        assert!(matches!(
            &events[0],
            LedgerEvent::ProofSubmitted { fee, .. } if *fee == FeeAmount::new(500)
        ));
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn failed_governance_calls_emit_nothing() {
        let mut e = engine();
        assert_eq!(
            e.set_verification_fee(&ctx(USER, 0), FeeAmount::new(1)),
            Err(LedgerError::AuthorityNotSet)
        );
        assert!(e.drain_events().is_empty());
    }
}
