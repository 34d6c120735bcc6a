#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use credence_governance::{Governance, GovernanceConfig};
use credence_ledger::{CallContext, LedgerSnapshot, LifecycleEngine, ProofSubmission};
use credence_nullables::{NullStore, NullTransferSink};
use credence_store::{ProofStore, UserStore};
use credence_types::{FeeAmount, Height, LedgerParams, Principal, ProofId};

const PRINCIPALS: [&str; 4] = ["ST1TEST", "ST2AUTH", "ST3INST", "ST4OTHER"];

#[derive(Arbitrary, Debug)]
enum Call {
    SetAuthority { who: u8, authority: u8 },
    SetMax { who: u8, max: u8 },
    SetFee { who: u8, fee: u16 },
    RegisterUser { who: u8 },
    RegisterInstitution { who: u8, name: String },
    Submit { who: u8, hash: Vec<u8>, credential_type: String, metadata: String, expiry: u8, level: u8 },
    Verify { who: u8, id: u8, signature: Vec<u8> },
    Reject { who: u8, id: u8 },
    Revoke { who: u8, id: u8, reason: String },
    Tick { blocks: u8 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    restrict: bool,
    calls: Vec<Call>,
}

fn principal(who: u8) -> &'static str {
    PRINCIPALS[usize::from(who) % PRINCIPALS.len()]
}

// Drive the engine with arbitrary call sequences. Every call must either
// apply fully or leave the ledger untouched, and the ledger invariants must
// hold after every step.
fuzz_target!(|input: Input| {
    let governance = Governance::new(
        LedgerParams::default(),
        GovernanceConfig {
            restrict_to_authority: input.restrict,
        },
    );
    let mut engine = LifecycleEngine::new(NullStore::new(), NullTransferSink::new(), governance);
    let mut height = 0u64;
    let mut expected_next = 0u64;

    for call in input.calls.iter().take(256) {
        let now = height;
        let ctx = move |who: u8| CallContext::new(principal(who), now);
        let proofs_before = engine.store().proof_count().unwrap();
        match call {
            Call::SetAuthority { who, authority } => {
                let _ = engine.set_authority(&ctx(*who), Principal::new(principal(*authority)));
            }
            Call::SetMax { who, max } => {
                let _ = engine.set_max_proofs_per_user(&ctx(*who), u64::from(*max));
            }
            Call::SetFee { who, fee } => {
                let _ = engine.set_verification_fee(&ctx(*who), FeeAmount::new(u128::from(*fee)));
            }
            Call::RegisterUser { who } => {
                let _ = engine.register_user(&ctx(*who));
            }
            Call::RegisterInstitution { who, name } => {
                let _ = engine.register_institution(&ctx(*who), name);
            }
            Call::Submit { who, hash, credential_type, metadata, expiry, level } => {
                let result = engine.submit_proof(
                    &ctx(*who),
                    ProofSubmission {
                        proof_hash: hash,
                        credential_type,
                        metadata,
                        expiry: Height::new(u64::from(*expiry)),
                        verification_level: u32::from(*level),
                    },
                );
                match result {
                    Ok(id) => {
                        assert_eq!(id, ProofId::new(expected_next));
                        expected_next += 1;
                        assert_eq!(engine.store().proof_count().unwrap(), proofs_before + 1);
                    }
                    Err(_) => assert_eq!(engine.store().proof_count().unwrap(), proofs_before),
                }
            }
            Call::Verify { who, id, signature } => {
                let before = engine.get_proof(ProofId::new(u64::from(*id))).unwrap();
                if engine
                    .verify_proof(&ctx(*who), ProofId::new(u64::from(*id)), signature)
                    .is_err()
                {
                    assert_eq!(engine.get_proof(ProofId::new(u64::from(*id))).unwrap(), before);
                }
            }
            Call::Reject { who, id } => {
                let _ = engine.reject_proof(&ctx(*who), ProofId::new(u64::from(*id)));
            }
            Call::Revoke { who, id, reason } => {
                let _ = engine.revoke_proof(&ctx(*who), ProofId::new(u64::from(*id)), reason);
            }
            Call::Tick { blocks } => height += u64::from(*blocks),
        }

        let proofs = engine.store().iter_proofs().unwrap();
        for proof in &proofs {
            assert!(!(proof.verified && proof.rejected));
            assert!(!proof.revoked || proof.verified);
            assert!(proof.is_consistent());
        }
        for user in engine.store().iter_users().unwrap() {
            let owned = proofs.iter().filter(|p| p.owner == user.principal).count() as u64;
            assert_eq!(user.proof_count, owned);
        }
        assert_eq!(engine.sink().transfers().len(), proofs.len());
    }

    let snapshot = LedgerSnapshot::capture(&engine, Height::new(height)).unwrap();
    assert!(snapshot.verify());
    assert!(snapshot
        .restore(NullStore::new(), NullTransferSink::new(), GovernanceConfig::default())
        .is_ok());
});
