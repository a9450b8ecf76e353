// Copyright (c) 2026 PaaSForChain. MIT License.
// See LICENSE for details.

//! # Provenance Protocol -- Client Core
//!
//! Everything needed to turn "create this agent" into a cryptographically
//! signed transaction envelope the provenance ledger will accept: canonical
//! payload encoding, deterministic address derivation, header construction,
//! and secp256k1 signing.
//!
//! What this crate deliberately is **not**: a submission client (no HTTP, no
//! batching, no retries), a key store (key material is borrowed from the
//! caller for one signing call and returned), or a rules engine (whether
//! "Alice" may create that record is the ledger-side processor's problem).
//!
//! ## Architecture
//!
//! The modules mirror the stages of building a transaction:
//!
//! - **config** -- Family identity and every wire constant. One place.
//! - **registry** -- The closed action set plus the versioned field-layout
//!   schema, loaded once and read-only after.
//! - **addressing** -- Pure derivation of the ledger state addresses an
//!   action reads and writes.
//! - **payload** -- Canonical action-parameter encoding; the decoder side for
//!   verification and tooling.
//! - **crypto** -- SHA-512/SHA-256 digests and secp256k1 ECDSA. Thin wrappers
//!   over audited implementations; nothing homegrown.
//! - **transaction** -- The builder that orchestrates all of the above into a
//!   signed envelope, and the verification pass that re-checks one.
//! - **wire** -- The shared little-endian, length-prefixed byte conventions.
//!
//! ## Design Philosophy
//!
//! 1. Canonical bytes or no bytes -- every encoder is deterministic.
//! 2. Fail before signing: nothing touches a secret key until the request
//!    has been fully validated.
//! 3. Explicit context over ambient state -- the registry is a value you
//!    pass, not a global you hope was initialized.
//! 4. If it gets signed, it has tests. Plural.

pub mod addressing;
pub mod config;
pub mod crypto;
pub mod payload;
pub mod registry;
pub mod transaction;
pub mod wire;

pub use crypto::{KeyPair, PublicKey, Signature};
pub use payload::{ActionParameters, ActionValue};
pub use registry::{ActionKind, ActionRegistry, SchemaError, UnknownAction};
pub use transaction::{
    build_transaction, verify_transaction, BuildError, Transaction, TransactionBuilder,
    TransactionHeader, VerifyError,
};
