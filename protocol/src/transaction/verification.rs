//! Transaction verification: the independent tamper-detection pass.
//!
//! A [`Transaction`](super::Transaction) is three byte fields that must agree
//! with each other. This module re-derives every binding from scratch --
//! nothing is trusted from construction time -- so any post-build mutation of
//! header or payload, down to a single byte, is caught here.
//!
//! Checks run cheapest-first: structural decode before hashing, hashing
//! before signature verification. Invalid transactions should waste as
//! little CPU as possible on their way out.

use thiserror::Error;

use crate::crypto::hash::{sha256, sha512_hex};
use crate::crypto::keys::{PublicKey, Signature};
use crate::payload::decode_payload;
use crate::registry::ActionRegistry;
use crate::transaction::builder::Transaction;
use crate::transaction::header::TransactionHeader;
use crate::wire::DecodeError;

/// Why a finished envelope failed verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The header bytes do not decode as a canonical header.
    #[error("header bytes do not decode: {0}")]
    HeaderDecode(DecodeError),

    /// The header's payload digest does not match the payload bytes --
    /// one of the two was altered after construction.
    #[error("payload digest mismatch: header binds {bound}, payload hashes to {actual}")]
    DigestMismatch { bound: String, actual: String },

    /// The header's signer public key is not a valid curve point encoding.
    #[error("signer public key in header is malformed")]
    MalformedSignerKey,

    /// The envelope's signature is not 64 hex-decodable compact bytes.
    #[error("header signature is malformed")]
    MalformedSignature,

    /// The signature does not verify over sha256(header bytes) -- the header
    /// was altered after signing, or the signature never matched.
    #[error("header signature does not verify against the signer key")]
    InvalidSignature,

    /// The payload bytes do not decode against the registry.
    #[error("payload bytes do not decode: {0}")]
    PayloadDecode(DecodeError),
}

/// Verify the internal bindings of a signed envelope.
///
/// In order:
///
/// 1. header decodes as canonical bytes;
/// 2. `header.payload_sha512 == sha512(payload)`;
/// 3. the signer key parses, the signature parses;
/// 4. the signature verifies over `sha256(header bytes)`.
///
/// A pass means the envelope is exactly what some holder of the signer's
/// secret key constructed -- not that the validator will accept it (family
/// registration, permissions, and business rules live ledger-side).
pub fn verify_transaction(tx: &Transaction) -> Result<(), VerifyError> {
    let header = TransactionHeader::decode(&tx.header).map_err(VerifyError::HeaderDecode)?;

    let actual = sha512_hex(&tx.payload);
    if header.payload_sha512 != actual {
        return Err(VerifyError::DigestMismatch {
            bound: header.payload_sha512,
            actual,
        });
    }

    let signer = PublicKey::from_hex(&header.signer_public_key)
        .map_err(|_| VerifyError::MalformedSignerKey)?;
    let signature =
        Signature::from_hex(&tx.header_signature).map_err(|_| VerifyError::MalformedSignature)?;

    if !signer.verify_digest(&sha256(&tx.header), &signature) {
        return Err(VerifyError::InvalidSignature);
    }

    Ok(())
}

/// [`verify_transaction`] plus a structural decode of the payload against
/// the registry -- catches envelopes whose bindings hold but whose payload
/// was never produced by this family's codec.
pub fn verify_transaction_with_registry(
    tx: &Transaction,
    registry: &ActionRegistry,
) -> Result<(), VerifyError> {
    verify_transaction(tx)?;
    decode_payload(registry, &tx.payload).map_err(VerifyError::PayloadDecode)?;
    Ok(())
}
