//! # Transaction Module
//!
//! Construction, signing, and verification of ledger transaction envelopes.
//!
//! ## Architecture
//!
//! ```text
//! header.rs       -- TransactionHeader and its canonical byte codec
//! builder.rs      -- TransactionBuilder: resolve, validate, route, encode, sign
//! verification.rs -- Independent tamper-detection pass over a finished envelope
//! ```
//!
//! ## Envelope Lifecycle
//!
//! 1. **Build** -- [`TransactionBuilder`] (or [`build_transaction`]) turns an
//!    action request into a signed [`Transaction`] in one all-or-nothing call.
//! 2. **Verify** -- [`verify_transaction`] re-checks the finished envelope:
//!    header decodes, payload digest matches, signature holds.
//! 3. **Submit** -- someone else's job. The envelope is handed to whatever
//!    submission layer the caller runs; this crate never touches a network.
//!
//! ## Design Decisions
//!
//! - The header binds the payload by SHA-512 digest, computed exactly once
//!   from the freshly encoded payload bytes. Nothing ever recomputes it into
//!   the header afterwards -- a stale digest is a bug the verification pass
//!   exists to catch.
//! - The signature covers sha256(header bytes) -- the exact bytes in the
//!    envelope, not a re-derived header.
//! - Address sets are sorted and deduplicated before encoding so identical
//!   logical requests produce identical header bytes (nonce aside).

pub mod builder;
pub mod header;
pub mod verification;

pub use builder::{build_transaction, BuildError, Transaction, TransactionBuilder};
pub use header::TransactionHeader;
pub use verification::{verify_transaction, verify_transaction_with_registry, VerifyError};
