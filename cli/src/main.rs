// Copyright (c) 2026 PaaSForChain. MIT License.
// See LICENSE for details.

//! # Provenance CLI
//!
//! Entry point for the `provenance` binary. Parses CLI arguments,
//! initializes logging, loads the action registry once, and dispatches:
//!
//! - `keygen`  -- generate a secp256k1 keypair
//! - `actions` -- list the registered actions and their field layouts
//! - `build`   -- construct and sign a transaction envelope
//! - `verify`  -- re-check a finished envelope
//!
//! Envelope JSON goes to stdout; everything else goes to stderr.

mod cli;
mod logging;

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Parser;

use provenance_protocol::crypto::KeyPair;
use provenance_protocol::payload::{ActionParameters, ActionValue};
use provenance_protocol::registry::{ActionRegistry, FieldType};
use provenance_protocol::transaction::{
    build_transaction, verify_transaction_with_registry, Transaction,
};

use cli::{BuildArgs, Commands, ProvenanceCli, VerifyArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = ProvenanceCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    // The registry is loaded exactly once and passed down -- every command
    // needs it, and a broken schema artifact should stop us right here.
    let registry = ActionRegistry::bundled().context("failed to load action schema")?;

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Actions => list_actions(&registry),
        Commands::Build(args) => build(&registry, args),
        Commands::Verify(args) => verify(&registry, args),
    }
}

/// Generate a fresh keypair and print it as JSON.
fn keygen() -> Result<()> {
    let keypair = KeyPair::generate().context("key generation failed")?;
    let out = serde_json::json!({
        "private_key": hex::encode(keypair.secret_bytes()),
        "public_key": keypair.public_key_hex(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// List every registered action with its field layout.
fn list_actions(registry: &ActionRegistry) -> Result<()> {
    for descriptor in registry.actions() {
        println!("{} (code {})", descriptor.name, descriptor.code);
        for field in &descriptor.fields {
            let required = if field.required { "required" } else { "optional" };
            println!("    {}: {} ({})", field.name, field.ty, required);
        }
    }
    Ok(())
}

/// Build, sign, and print one transaction envelope.
fn build(registry: &ActionRegistry, args: BuildArgs) -> Result<()> {
    let signer = KeyPair::from_hex(&args.key).context("invalid signing key")?;
    let batcher = match &args.batcher {
        Some(hex_key) => provenance_protocol::crypto::PublicKey::from_hex(hex_key)
            .context("invalid batcher public key")?,
        None => signer.public_key(),
    };

    let parameters = parse_parameters(registry, &args.action, &args.params)?;

    let tx = build_transaction(
        registry,
        &args.action,
        parameters,
        &signer,
        &batcher,
        args.dependencies,
    )
    .with_context(|| format!("failed to build `{}` transaction", args.action))?;

    tracing::info!(id = %tx.id(), action = %args.action, "transaction built");

    let json = if args.pretty {
        serde_json::to_string_pretty(&tx)?
    } else {
        serde_json::to_string(&tx)?
    };
    println!("{json}");
    Ok(())
}

/// Parse repeated `field=value` arguments into typed action parameters,
/// coercing each value to the field's declared wire type.
fn parse_parameters(
    registry: &ActionRegistry,
    action: &str,
    raw_params: &[String],
) -> Result<ActionParameters> {
    let descriptor = registry.resolve(action)?;

    let mut parameters = ActionParameters::new();
    for raw in raw_params {
        let (name, value) = raw
            .split_once('=')
            .with_context(|| format!("`{raw}` is not of the form field=value"))?;
        let field = descriptor
            .field(name)
            .with_context(|| format!("`{name}` is not a field of `{action}`"))?;

        let value: ActionValue = match field.ty {
            FieldType::Str => ActionValue::Str(value.to_string()),
            FieldType::U64 => ActionValue::U64(
                value
                    .parse()
                    .with_context(|| format!("`{name}` expects an unsigned integer"))?,
            ),
            FieldType::I64 => ActionValue::I64(
                value
                    .parse()
                    .with_context(|| format!("`{name}` expects a signed integer"))?,
            ),
            FieldType::Bool => ActionValue::Bool(
                value
                    .parse()
                    .with_context(|| format!("`{name}` expects true or false"))?,
            ),
            FieldType::Bytes => ActionValue::Bytes(
                hex::decode(value).with_context(|| format!("`{name}` expects hex bytes"))?,
            ),
        };
        parameters.insert(name, value);
    }
    Ok(parameters)
}

/// Read an envelope from file or stdin and run the full verification pass.
fn verify(registry: &ActionRegistry, args: VerifyArgs) -> Result<()> {
    let raw = match args.envelope.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read envelope from stdin")?;
            buf
        }
    };

    let tx: Transaction = serde_json::from_str(&raw).context("envelope is not valid JSON")?;

    match verify_transaction_with_registry(&tx, registry) {
        Ok(()) => {
            println!("OK {}", tx.id());
            Ok(())
        }
        Err(err) => bail!("envelope failed verification: {err}"),
    }
}
