#![no_main]

use libfuzzer_sys::fuzz_target;

use credence_ledger::LedgerSnapshot;
use credence_node::{CallEnvelope, LedgerNode, NodeConfig};

// Fuzz JSON envelope parsing and snapshot decoding with arbitrary bytes.
// Neither may panic, and a decoded envelope must dispatch without a node error.
fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = serde_json::from_slice::<CallEnvelope>(data) {
        if let Ok(node) = LedgerNode::in_memory(&NodeConfig::default()) {
            assert!(node.dispatch(&envelope).is_ok());
        }
    }

    if let Ok(snapshot) = LedgerSnapshot::from_bytes(data) {
        let _ = snapshot.verify();
    }
});
