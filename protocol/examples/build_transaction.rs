//! Builds and verifies a `create_agent` transaction offline, then prints the
//! envelope as JSON -- the exact bytes a submission layer would post.
//!
//! Run with: `cargo run --example build_transaction`

use provenance_protocol::crypto::KeyPair;
use provenance_protocol::payload::ActionParameters;
use provenance_protocol::registry::ActionRegistry;
use provenance_protocol::transaction::{build_transaction, verify_transaction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = ActionRegistry::bundled()?;

    // In a real deployment both keys come from the caller's wallet; the
    // batcher key belongs to whoever wraps transactions for submission.
    let signer = KeyPair::generate()?;
    let batcher = KeyPair::generate()?.public_key();

    let tx = build_transaction(
        &registry,
        "create_agent",
        ActionParameters::new().with("name", "Alice"),
        &signer,
        &batcher,
        vec![],
    )?;

    verify_transaction(&tx)?;

    println!("{}", serde_json::to_string_pretty(&tx)?);
    eprintln!("transaction id: {}", tx.id());
    Ok(())
}
