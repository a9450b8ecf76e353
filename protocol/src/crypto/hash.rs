//! # Hashing Utilities
//!
//! Two hash functions, two jobs, zero flexibility:
//!
//! - **SHA-512** -- the digest of record. Payload digests in transaction
//!   headers and every ledger address tail are sha512-derived, because that
//!   is what the validator recomputes on its side. Not negotiable.
//!
//! - **SHA-256** -- the digest the header signature covers. secp256k1 signs
//!   exactly 32 bytes of message, so the header bytes are compressed through
//!   SHA-256 before signing, the same way the original signing stack does it.
//!
//! Both are exposed as fixed-size-array returns so the length is carried in
//! the type instead of being one `len()` assertion away from a bug.

use sha2::{Digest, Sha256, Sha512};

use crate::config::NAMESPACE_LENGTH;

/// Compute the SHA-512 hash of the input data.
///
/// Returns the full 64-byte digest. Used for payload digesting (the header
/// stores it hex-encoded) and as the raw material for address derivation.
///
/// # Example
///
/// ```
/// use provenance_protocol::crypto::sha512;
///
/// let digest = sha512(b"payload bytes");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 64];
    output.copy_from_slice(&result);
    output
}

/// SHA-512 as a lowercase hex string -- 128 characters.
///
/// This is the form that travels: the header's payload digest field is the
/// hex string, not the raw bytes, matching the wire contract of the family's
/// validator.
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(sha512(data))
}

/// Compute the SHA-256 hash of the input data.
///
/// Returns the 32-byte digest. This is the message handed to the signer --
/// nothing else in the protocol uses SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the 6-hex-char namespace prefix for a transaction family.
///
/// `sha512(family_name)` truncated to the first 6 hex characters (3 bytes).
/// Deterministic by construction -- every client and validator computing this
/// for the same family lands on the same prefix.
pub fn namespace_prefix(family_name: &str) -> String {
    let mut hex_digest = sha512_hex(family_name.as_bytes());
    hex_digest.truncate(NAMESPACE_LENGTH);
    hex_digest
}
