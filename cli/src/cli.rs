//! # CLI Interface
//!
//! Command-line argument structure for the `provenance` binary, using
//! `clap` derive. Four subcommands: `keygen`, `actions`, `build`, and
//! `verify` -- everything needed to produce and check signed envelopes
//! offline. Submission is somebody else's binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Offline transaction tooling for the provenance ledger family.
///
/// Builds canonically encoded, secp256k1-signed transaction envelopes and
/// verifies finished ones. Envelopes go to stdout as JSON; logs go to
/// stderr, so the output pipes cleanly into whatever submits it.
#[derive(Parser, Debug)]
#[command(
    name = "provenance",
    about = "Build and verify signed ledger transactions",
    version,
    propagate_version = true
)]
pub struct ProvenanceCli {
    /// Default log level when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info", env = "PROVENANCE_LOG")]
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `provenance` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh secp256k1 keypair and print it as JSON.
    Keygen,
    /// List the actions the bundled schema registers, with field layouts.
    Actions,
    /// Build a signed transaction envelope for one action.
    Build(BuildArgs),
    /// Verify a finished envelope (digest binding, signature, payload).
    Verify(VerifyArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Action name from the registry, e.g. `create_agent`.
    #[arg(long, short = 'a')]
    pub action: String,

    /// Action parameter as `field=value`, repeatable. Values are coerced to
    /// the field's declared type (`bytes` fields take hex).
    #[arg(long = "param", short = 'p', value_name = "FIELD=VALUE")]
    pub params: Vec<String>,

    /// Hex-encoded secp256k1 secret key of the signing agent.
    ///
    /// **Never pass this flag on a shared machine's command line** -- use the
    /// environment variable instead.
    #[arg(long, env = "PROVENANCE_KEY", hide_env_values = true)]
    pub key: String,

    /// Hex-encoded public key of the batcher that will wrap the transaction.
    ///
    /// When omitted, the signer batches for themselves.
    #[arg(long)]
    pub batcher: Option<String>,

    /// Transaction id (header signature) this transaction depends on.
    /// Repeatable; order is preserved.
    #[arg(long = "dep", value_name = "TXN_ID")]
    pub dependencies: Vec<String>,

    /// Pretty-print the envelope JSON.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Path to the envelope JSON. Reads stdin when omitted or `-`.
    #[arg(long, short = 'e')]
    pub envelope: Option<PathBuf>,
}
