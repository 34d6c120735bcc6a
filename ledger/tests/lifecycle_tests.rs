//! End-to-end lifecycle scenarios against the nullable store and sink.

use credence_governance::{Governance, GovernanceConfig};
use credence_ledger::{CallContext, LedgerEvent, LifecycleEngine, ProofSubmission};
use credence_nullables::{NullHeight, NullStore, NullTransferSink};
use credence_store::{FeeTransfer, ProofStore};
use credence_types::{
    FeeAmount, Height, LedgerError, LedgerParams, Principal, ProofHash, ProofId,
};

const USER: &str = "ST1TEST";
const AUTH: &str = "ST2AUTH";
const INST: &str = "ST3INST";
const OTHER: &str = "ST4OTHER";

struct Harness {
    engine: LifecycleEngine<NullStore, NullTransferSink>,
    clock: NullHeight,
}

impl Harness {
    fn new() -> Self {
        Self::with_governance(Governance::default())
    }

    fn with_governance(governance: Governance) -> Self {
        Self {
            engine: LifecycleEngine::new(NullStore::new(), NullTransferSink::new(), governance),
            clock: NullHeight::new(0),
        }
    }

    fn as_(&self, caller: &str) -> CallContext {
        CallContext::new(caller, self.clock.now())
    }

    fn setup(&mut self) {
        self.engine.register_user(&self.as_(USER)).unwrap();
        self.engine
            .register_institution(&self.as_(INST), "UniversityX")
            .unwrap();
        self.engine
            .set_authority(&self.as_(USER), Principal::new(AUTH))
            .unwrap();
    }

    fn submit(&mut self, caller: &str, marker: u8, expiry: u64) -> Result<ProofId, LedgerError> {
        let mut hash = [0u8; 32];
        hash[31] = marker;
        let ctx = self.as_(caller);
        self.engine.submit_proof(
            &ctx,
            ProofSubmission {
                proof_hash: &hash,
                credential_type: "BSc Computer Science",
                metadata: "Graduated 2024",
                expiry: Height::new(expiry),
                verification_level: 3,
            },
        )
    }
}

#[test]
fn submit_charges_the_fee_and_starts_unverified() {
    let mut h = Harness::new();
    h.setup();

    assert_eq!(h.submit(USER, 1, 100), Ok(ProofId::new(0)));
    assert_eq!(
        h.engine.sink().transfers(),
        vec![FeeTransfer {
            amount: FeeAmount::new(500),
            from: Principal::new(USER),
            to: Principal::new(AUTH),
        }]
    );
    let proof = h.engine.get_proof(ProofId::new(0)).unwrap().unwrap();
    assert!(!proof.verified);
    assert!(!proof.rejected);
    assert!(!proof.revoked);
    assert_eq!(proof.id, ProofId::new(0));
    assert_eq!(proof.owner, Principal::new(USER));
    assert_eq!(proof.submitted_at, Height::new(0));

    // Stored fields match the submitted arguments exactly.
    let mut expected_hash = [0u8; 32];
    expected_hash[31] = 1;
    assert_eq!(proof.proof_hash, ProofHash::new(expected_hash));
    assert_eq!(proof.credential_type, "BSc Computer Science");
    assert_eq!(proof.metadata, "Graduated 2024");
    assert_eq!(proof.expiry, Height::new(100));
    assert_eq!(proof.verification_level, 3);
    assert_eq!(proof.institution, None);
    assert_eq!(proof.signature, None);
    assert_eq!(proof.revocation_reason, None);
    assert_eq!(proof.revoked_at, None);
    assert_eq!(
        h.engine.get_proof_by_hash(&proof.proof_hash).unwrap(),
        Some(proof.clone())
    );
}

#[test]
fn repeated_verify_is_refused_and_changes_nothing() {
    let mut h = Harness::new();
    h.setup();
    h.submit(USER, 1, 100).unwrap();
    h.clock.set(10);
    h.engine
        .verify_proof(&h.as_(INST), ProofId::new(0), &[0xAB; 65])
        .unwrap();
    h.engine.drain_events();
    let before = h.engine.get_proof(ProofId::new(0)).unwrap();

    for attempt in 0..5u8 {
        h.clock.advance(1);
        assert_eq!(
            h.engine
                .verify_proof(&h.as_(INST), ProofId::new(0), &[attempt; 65]),
            Err(LedgerError::AlreadyVerified)
        );
        assert_eq!(h.engine.get_proof(ProofId::new(0)).unwrap(), before);
    }
    assert!(h.engine.drain_events().is_empty());
    assert_eq!(h.engine.sink().transfers().len(), 1);
}

#[test]
fn verification_expires_after_expiry_height() {
    let mut h = Harness::new();
    h.setup();
    h.submit(USER, 1, 100).unwrap();

    h.clock.set(50);
    h.engine
        .verify_proof(&h.as_(INST), ProofId::new(0), &[0xAB; 65])
        .unwrap();
    let proof = h.engine.get_proof(ProofId::new(0)).unwrap().unwrap();
    assert!(proof.verified);
    assert_eq!(proof.institution, Some(Principal::new(INST)));

    // Still valid at the expiry height itself.
    h.clock.set(100);
    assert!(h.engine.is_proof_verified(&h.as_(OTHER), ProofId::new(0)).unwrap());
    h.clock.set(101);
    assert!(!h.engine.is_proof_verified(&h.as_(OTHER), ProofId::new(0)).unwrap());
}

#[test]
fn verify_at_expiry_height_fails() {
    let mut h = Harness::new();
    h.setup();
    h.submit(USER, 1, 100).unwrap();
    h.clock.set(100);
    assert_eq!(
        h.engine.verify_proof(&h.as_(INST), ProofId::new(0), &[1; 65]),
        Err(LedgerError::ProofExpired)
    );
}

#[test]
fn revoke_by_stranger_changes_nothing() {
    let mut h = Harness::new();
    h.setup();
    h.submit(USER, 1, 100).unwrap();
    h.engine
        .verify_proof(&h.as_(INST), ProofId::new(0), &[1; 65])
        .unwrap();
    let before = h.engine.get_proof(ProofId::new(0)).unwrap();
    h.engine.drain_events();

    assert_eq!(
        h.engine
            .revoke_proof(&h.as_(OTHER), ProofId::new(0), "Invalid data"),
        Err(LedgerError::RevocationNotAllowed)
    );
    assert_eq!(h.engine.get_proof(ProofId::new(0)).unwrap(), before);
    assert!(h.engine.drain_events().is_empty());
}

#[test]
fn full_lifecycle_emits_events_in_order() {
    let mut h = Harness::new();
    h.setup();
    h.submit(USER, 1, 100).unwrap();
    h.clock.advance(10);
    h.engine
        .verify_proof(&h.as_(INST), ProofId::new(0), &[1; 65])
        .unwrap();
    h.clock.advance(10);
    h.engine
        .revoke_proof(&h.as_(USER), ProofId::new(0), "Invalid data")
        .unwrap();

    let topics: Vec<_> = h.engine.drain_events().iter().map(LedgerEvent::topic).collect();
    assert_eq!(
        topics,
        [
            "user_registered",
            "institution_registered",
            "authority_set",
            "proof_submitted",
            "proof_verified",
            "proof_revoked",
        ]
    );
    let proof = h.engine.get_proof(ProofId::new(0)).unwrap().unwrap();
    assert_eq!(proof.revoked_at, Some(Height::new(20)));
}

#[test]
fn ids_are_sequential_and_hash_index_agrees() {
    let mut h = Harness::new();
    h.setup();
    for marker in 0..5u8 {
        assert_eq!(h.submit(USER, marker, 100), Ok(ProofId::new(marker as u64)));
    }
    for proof in h.engine.store().iter_proofs().unwrap() {
        let by_hash = h.engine.get_proof_by_hash(&proof.proof_hash).unwrap();
        assert_eq!(by_hash.map(|p| p.id), Some(proof.id));
    }
    assert_eq!(h.engine.store().hash_index_len(), 5);
}

#[test]
fn failed_submissions_do_not_consume_ids() {
    let mut h = Harness::new();
    h.setup();
    h.submit(USER, 1, 100).unwrap();
    assert_eq!(h.submit(USER, 1, 100), Err(LedgerError::ProofAlreadyExists));
    assert_eq!(h.submit(USER, 2, 0), Err(LedgerError::InvalidExpiry));
    assert_eq!(h.submit(OTHER, 3, 100), Err(LedgerError::UserNotRegistered));
    assert_eq!(h.submit(USER, 4, 100), Ok(ProofId::new(1)));
}

#[test]
fn balance_shortfall_rejects_submission() {
    let sink = NullTransferSink::with_balances([(Principal::new(USER), 700)]);
    let mut engine = LifecycleEngine::new(NullStore::new(), sink, Governance::default());
    let ctx = CallContext::new(USER, 0);
    engine.register_user(&ctx).unwrap();
    engine.set_authority(&ctx, Principal::new(AUTH)).unwrap();

    let submit = |engine: &mut LifecycleEngine<NullStore, NullTransferSink>, marker: u8| {
        let hash = [marker; 32];
        engine.submit_proof(
            &ctx,
            ProofSubmission {
                proof_hash: &hash,
                credential_type: "BSc",
                metadata: "",
                expiry: Height::new(10),
                verification_level: 1,
            },
        )
    };
    assert_eq!(submit(&mut engine, 1), Ok(ProofId::new(0)));
    assert!(matches!(submit(&mut engine, 2), Err(LedgerError::TransferFailed(_))));
    assert_eq!(engine.sink().balance(&Principal::new(USER)), Some(200));
    assert_eq!(engine.sink().balance(&Principal::new(AUTH)), Some(500));
    assert_eq!(engine.store().proof_count().unwrap(), 1);
}

#[test]
fn zero_fee_still_records_a_transfer() {
    let mut h = Harness::new();
    h.setup();
    h.engine
        .set_verification_fee(&h.as_(AUTH), FeeAmount::ZERO)
        .unwrap();
    h.submit(USER, 1, 100).unwrap();
    assert_eq!(h.engine.sink().transfers()[0].amount, FeeAmount::ZERO);
}

#[test]
fn restricted_governance_rejects_other_callers() {
    let governance = Governance::new(
        LedgerParams::default(),
        GovernanceConfig {
            restrict_to_authority: true,
        },
    );
    let mut h = Harness::with_governance(governance);
    h.setup();
    assert_eq!(
        h.engine.set_max_proofs_per_user(&h.as_(USER), 10),
        Err(LedgerError::NotAuthorized)
    );
    h.engine
        .set_max_proofs_per_user(&h.as_(AUTH), 10)
        .unwrap();
    assert_eq!(h.engine.governance().max_proofs_per_user(), 10);
}

#[test]
fn unrestricted_governance_accepts_any_caller() {
    let mut h = Harness::new();
    h.setup();
    h.engine
        .set_max_proofs_per_user(&h.as_(OTHER), 1)
        .unwrap();
    h.submit(USER, 1, 100).unwrap();
    assert_eq!(h.submit(USER, 2, 100), Err(LedgerError::MaxProofsExceeded));
}

#[test]
fn second_authority_is_refused() {
    let mut h = Harness::new();
    h.setup();
    assert_eq!(
        h.engine
            .set_authority(&h.as_(OTHER), Principal::new(OTHER)),
        Err(LedgerError::AuthorityAlreadySet)
    );
    assert_eq!(h.engine.governance().authority(), Some(&Principal::new(AUTH)));
}

#[test]
fn registration_conflicts() {
    let mut h = Harness::new();
    h.setup();
    assert_eq!(
        h.engine.register_user(&h.as_(USER)),
        Err(LedgerError::AlreadyRegistered)
    );
    assert_eq!(
        h.engine.register_institution(&h.as_(INST), "Another"),
        Err(LedgerError::AlreadyRegistered)
    );
    assert_eq!(
        h.engine.register_institution(&h.as_(OTHER), ""),
        Err(LedgerError::InvalidName)
    );
    // A principal may hold both roles.
    h.engine
        .register_institution(&h.as_(USER), "Self-certifier")
        .unwrap();
}
