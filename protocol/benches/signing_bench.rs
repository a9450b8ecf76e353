// Signing & construction benchmarks.
//
// Covers secp256k1 keypair generation, digest signing and verification,
// canonical payload/header encoding, and the full build pipeline.

use criterion::{criterion_group, criterion_main, Criterion};

use provenance_protocol::crypto::hash::{sha256, sha512_hex};
use provenance_protocol::crypto::KeyPair;
use provenance_protocol::payload::{encode_payload, ActionParameters};
use provenance_protocol::registry::ActionRegistry;
use provenance_protocol::transaction::{build_transaction, verify_transaction};

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("secp256k1/keypair_generate", |b| {
        b.iter(|| KeyPair::generate().unwrap());
    });
}

fn bench_sign_digest(c: &mut Criterion) {
    let keypair = KeyPair::generate().unwrap();
    let digest = sha256(b"register agent Alice; nonce=42");

    c.bench_function("secp256k1/sign_digest", |b| {
        b.iter(|| keypair.sign_digest(&digest).unwrap());
    });
}

fn bench_verify_digest(c: &mut Criterion) {
    let keypair = KeyPair::generate().unwrap();
    let digest = sha256(b"register agent Alice; nonce=42");
    let signature = keypair.sign_digest(&digest).unwrap();
    let public_key = keypair.public_key();

    c.bench_function("secp256k1/verify_digest", |b| {
        b.iter(|| public_key.verify_digest(&digest, &signature));
    });
}

fn bench_encode_payload(c: &mut Criterion) {
    let registry = ActionRegistry::bundled().unwrap();
    let descriptor = registry.resolve("create_record").unwrap();
    let params = ActionParameters::new()
        .with("record_id", "fish-0001")
        .with("record_type", "fish-pallet")
        .with("properties", vec![0xAB; 256]);

    c.bench_function("codec/encode_payload", |b| {
        b.iter(|| encode_payload(descriptor, 1_700_000_000, &params).unwrap());
    });
}

fn bench_payload_digest(c: &mut Criterion) {
    let registry = ActionRegistry::bundled().unwrap();
    let descriptor = registry.resolve("create_record").unwrap();
    let params = ActionParameters::new()
        .with("record_id", "fish-0001")
        .with("record_type", "fish-pallet")
        .with("properties", vec![0xAB; 256]);
    let payload = encode_payload(descriptor, 1_700_000_000, &params).unwrap();

    c.bench_function("codec/sha512_payload_digest", |b| {
        b.iter(|| sha512_hex(&payload));
    });
}

fn bench_build_transaction(c: &mut Criterion) {
    let registry = ActionRegistry::bundled().unwrap();
    let signer = KeyPair::generate().unwrap();
    let batcher = KeyPair::generate().unwrap().public_key();

    c.bench_function("builder/build_transaction", |b| {
        b.iter(|| {
            build_transaction(
                &registry,
                "create_agent",
                ActionParameters::new().with("name", "Alice"),
                &signer,
                &batcher,
                vec![],
            )
            .unwrap()
        });
    });
}

fn bench_verify_transaction(c: &mut Criterion) {
    let registry = ActionRegistry::bundled().unwrap();
    let signer = KeyPair::generate().unwrap();
    let batcher = KeyPair::generate().unwrap().public_key();
    let tx = build_transaction(
        &registry,
        "create_agent",
        ActionParameters::new().with("name", "Alice"),
        &signer,
        &batcher,
        vec![],
    )
    .unwrap();

    c.bench_function("builder/verify_transaction", |b| {
        b.iter(|| verify_transaction(&tx).unwrap());
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_digest,
    bench_verify_digest,
    bench_encode_payload,
    bench_payload_digest,
    bench_build_transaction,
    bench_verify_transaction,
);
criterion_main!(benches);
