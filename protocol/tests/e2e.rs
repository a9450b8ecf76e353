//! End-to-end tests for the transaction construction core.
//!
//! These exercise the full pipeline the way a wallet or web client would:
//! load the registry once, derive keys, build signed envelopes, and check
//! the properties the ledger relies on -- canonical bytes, digest bindings,
//! signature validity, nonce freshness, and hard rejection of bad requests.
//!
//! Each test stands alone. No shared state, no ordering dependencies.

use provenance_protocol::addressing::agent_address;
use provenance_protocol::crypto::hash::{sha256, sha512_hex};
use provenance_protocol::crypto::{KeyPair, PublicKey, Signature};
use provenance_protocol::payload::{decode_payload, encode_payload, ActionParameters};
use provenance_protocol::registry::ActionRegistry;
use provenance_protocol::transaction::{
    build_transaction, verify_transaction, verify_transaction_with_registry, BuildError,
    Transaction, TransactionBuilder,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A fixed 32-byte secret so key-derivation assertions are reproducible.
const TEST_SECRET: [u8; 32] = [0x01; 32];

/// A second fixed secret for the batcher identity.
const BATCHER_SECRET: [u8; 32] = [0x02; 32];

fn setup() -> (ActionRegistry, KeyPair, PublicKey) {
    let registry = ActionRegistry::bundled().expect("bundled schema loads");
    let signer = KeyPair::from_secret_bytes(&TEST_SECRET).expect("fixed signer key");
    let batcher = KeyPair::from_secret_bytes(&BATCHER_SECRET)
        .expect("fixed batcher key")
        .public_key();
    (registry, signer, batcher)
}

fn build_create_agent(
    registry: &ActionRegistry,
    signer: &KeyPair,
    batcher: &PublicKey,
    name: &str,
) -> Transaction {
    build_transaction(
        registry,
        "create_agent",
        ActionParameters::new().with("name", name),
        signer,
        batcher,
        vec![],
    )
    .expect("create_agent builds")
}

// ---------------------------------------------------------------------------
// The fixed-key scenario
// ---------------------------------------------------------------------------

#[test]
fn create_agent_scenario_with_fixed_keys() {
    let (registry, signer, batcher) = setup();
    let tx = build_create_agent(&registry, &signer, &batcher, "Alice");

    // The header's signer key is the one derived from the fixed secret.
    let header = tx.decode_header().unwrap();
    assert_eq!(header.signer_public_key, signer.public_key_hex());
    assert_eq!(header.batcher_public_key, batcher.to_hex());

    // And the signature verifies against exactly that key.
    let signature = Signature::from_hex(&tx.header_signature).unwrap();
    let signer_key = PublicKey::from_hex(&header.signer_public_key).unwrap();
    assert!(signer_key.verify_digest(&sha256(&tx.header), &signature));

    // The payload carries the request back out.
    let payload = decode_payload(&registry, &tx.payload).unwrap();
    assert_eq!(payload.action, "create_agent");
    assert_eq!(payload.parameters.get("name").unwrap().as_str(), Some("Alice"));

    // The only address in play is the agent's own.
    assert_eq!(header.inputs, vec![agent_address(&signer.public_key_hex())]);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn encoders_are_deterministic_for_fixed_inputs() {
    let (registry, signer, batcher) = setup();

    let descriptor = registry.resolve("create_agent").unwrap();
    let params = ActionParameters::new().with("name", "Alice");
    assert_eq!(
        encode_payload(descriptor, 1_700_000_000, &params).unwrap(),
        encode_payload(descriptor, 1_700_000_000, &params).unwrap()
    );

    let build = || {
        TransactionBuilder::new(
            &registry,
            "create_agent",
            ActionParameters::new().with("name", "Alice"),
            &signer,
            &batcher,
        )
        .timestamp(1_700_000_000)
        .nonce("00112233445566778899aabbccddeeff")
        .build()
        .unwrap()
    };
    let tx1 = build();
    let tx2 = build();
    assert_eq!(tx1.header, tx2.header);
    assert_eq!(tx1.header_signature, tx2.header_signature);
    assert_eq!(tx1.payload, tx2.payload);
}

// ---------------------------------------------------------------------------
// Digest integrity & signature validity
// ---------------------------------------------------------------------------

#[test]
fn header_digest_equals_payload_hash() {
    let (registry, signer, batcher) = setup();
    let tx = build_create_agent(&registry, &signer, &batcher, "Alice");
    let header = tx.decode_header().unwrap();
    assert_eq!(header.payload_sha512, sha512_hex(&tx.payload));
}

#[test]
fn every_built_transaction_passes_verification() {
    let (registry, signer, batcher) = setup();

    let requests: Vec<(&str, ActionParameters)> = vec![
        ("create_agent", ActionParameters::new().with("name", "Alice")),
        (
            "create_record",
            ActionParameters::new()
                .with("record_id", "fish-0001")
                .with("record_type", "fish-pallet"),
        ),
        (
            "create_record_type",
            ActionParameters::new()
                .with("name", "fish-pallet")
                .with("schema", vec![0x01, 0x02, 0x03]),
        ),
        (
            "update_properties",
            ActionParameters::new()
                .with("record_id", "fish-0001")
                .with("properties", vec![0xAA, 0xBB]),
        ),
        (
            "finalize_record",
            ActionParameters::new().with("record_id", "fish-0001"),
        ),
    ];

    for (action, params) in requests {
        let tx = build_transaction(&registry, action, params, &signer, &batcher, vec![])
            .unwrap_or_else(|e| panic!("{action} failed to build: {e}"));
        verify_transaction(&tx).unwrap_or_else(|e| panic!("{action} failed verification: {e}"));
        verify_transaction_with_registry(&tx, &registry)
            .unwrap_or_else(|e| panic!("{action} failed registry verification: {e}"));
    }
}

#[test]
fn any_single_byte_mutation_invalidates_the_envelope() {
    let (registry, signer, batcher) = setup();
    let tx = build_create_agent(&registry, &signer, &batcher, "Alice");

    // Every byte of the header, and every byte of the payload. Exhaustive
    // on purpose -- this is the property the whole design hangs on.
    for index in 0..tx.header.len() {
        let mut tampered = tx.clone();
        tampered.header[index] ^= 0x01;
        assert!(
            verify_transaction(&tampered).is_err(),
            "header byte {index} mutation survived verification"
        );
    }
    for index in 0..tx.payload.len() {
        let mut tampered = tx.clone();
        tampered.payload[index] ^= 0x01;
        assert!(
            verify_transaction(&tampered).is_err(),
            "payload byte {index} mutation survived verification"
        );
    }
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

#[test]
fn identical_logical_requests_differ_by_nonce() {
    let (registry, signer, batcher) = setup();
    let tx1 = build_create_agent(&registry, &signer, &batcher, "Alice");
    let tx2 = build_create_agent(&registry, &signer, &batcher, "Alice");

    let nonce1 = tx1.decode_header().unwrap().nonce;
    let nonce2 = tx2.decode_header().unwrap().nonce;
    assert_ne!(nonce1, nonce2, "two builds must draw distinct nonces");
    assert_ne!(tx1.header, tx2.header);
    assert_ne!(
        tx1.header_signature, tx2.header_signature,
        "distinct header bytes must yield distinct signatures"
    );
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

#[test]
fn nonexistent_action_is_rejected_before_signing() {
    let (registry, signer, batcher) = setup();
    let err = build_transaction(
        &registry,
        "nonexistent_action",
        ActionParameters::new().with("name", "Alice"),
        &signer,
        &batcher,
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::UnknownAction(_)), "got {err:?}");
}

#[test]
fn omitted_required_field_is_rejected() {
    let (registry, signer, batcher) = setup();
    let err = build_transaction(
        &registry,
        "create_record",
        ActionParameters::new().with("record_id", "fish-0001"), // record_type missing
        &signer,
        &batcher,
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::MalformedAction(_)), "got {err:?}");
}

// ---------------------------------------------------------------------------
// Envelope serialization
// ---------------------------------------------------------------------------

#[test]
fn envelope_json_roundtrip() {
    let (registry, signer, batcher) = setup();
    let tx = build_create_agent(&registry, &signer, &batcher, "Alice");

    let json = serde_json::to_string(&tx).unwrap();
    let recovered: Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, tx);
    // Byte fields travel as hex strings, not JSON integer arrays.
    assert!(json.contains(&hex::encode(&tx.payload)));

    // A round-tripped envelope still verifies.
    verify_transaction(&recovered).unwrap();
}

// ---------------------------------------------------------------------------
// Dependency chaining
// ---------------------------------------------------------------------------

#[test]
fn dependent_transactions_reference_prior_ids() {
    let (registry, signer, batcher) = setup();

    let create = build_create_agent(&registry, &signer, &batcher, "Alice");
    let update = build_transaction(
        &registry,
        "update_properties",
        ActionParameters::new()
            .with("record_id", "fish-0001")
            .with("properties", vec![0x01]),
        &signer,
        &batcher,
        vec![create.id().to_string()],
    )
    .unwrap();

    let header = update.decode_header().unwrap();
    assert_eq!(header.dependencies, vec![create.id().to_string()]);
    verify_transaction(&update).unwrap();
}
