//! # Protocol Configuration & Constants
//!
//! Every magic number in this crate lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The family name and version are the contract with the ledger-side
//! validator: they must match its registered transaction family
//! byte-for-byte, or every transaction we produce is rejected downstream.
//! There is no local check that can catch a mismatch -- the validator is the
//! only authority on its own registration table.

// ---------------------------------------------------------------------------
// Transaction Family
// ---------------------------------------------------------------------------

/// The transaction family this client addresses on the ledger. Part of every
/// transaction header and the input to the namespace prefix derivation.
pub const FAMILY_NAME: &str = "paasforchain_adresser";

/// Schema compatibility tag for the family. Bumped in lockstep with the
/// ledger-side processor, never independently.
pub const FAMILY_VERSION: &str = "0.01";

/// Version tag the bundled action schema artifact must carry.
pub const SCHEMA_ARTIFACT_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Address Layout
// ---------------------------------------------------------------------------

/// A full ledger address is 35 bytes rendered as 70 hex characters:
/// 3-byte namespace prefix + 1-byte address-space infix + 31-byte identity tail.
pub const ADDRESS_LENGTH: usize = 70;

/// Namespace prefix length in hex characters (first 6 hex chars of
/// sha512(FAMILY_NAME)).
pub const NAMESPACE_LENGTH: usize = 6;

/// Address-space infix length in hex characters.
pub const INFIX_LENGTH: usize = 2;

/// Identity tail length in hex characters for single-entity addresses.
pub const ADDRESS_TAIL_LENGTH: usize = 62;

/// Two-hex-char infix for agent addresses.
pub const AGENT_INFIX: &str = "ae";

/// Two-hex-char infix for record addresses.
pub const RECORD_INFIX: &str = "ec";

/// Two-hex-char infix for property and property-page addresses.
pub const PROPERTY_INFIX: &str = "ea";

/// Two-hex-char infix for proposal addresses.
pub const PROPOSAL_INFIX: &str = "aa";

/// Two-hex-char infix for record-type addresses.
pub const RECORD_TYPE_INFIX: &str = "ee";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 -- the curve the ledger's validators verify against. ECDSA with
/// RFC 6979 deterministic nonces, so signing never consults an RNG.
pub const SIGNING_ALGORITHM: &str = "secp256k1/ECDSA";

/// Secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Compressed public key point encoding length in bytes. This is the form
/// that appears (hex-encoded) in transaction headers.
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Uncompressed public key point encoding length in bytes.
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

/// Compact ECDSA signature length in bytes (r || s).
pub const SIGNATURE_LENGTH: usize = 64;

/// Payload digest length in bytes. The header binds the payload via SHA-512.
pub const PAYLOAD_DIGEST_LENGTH: usize = 64;

/// Header digest length in bytes. The signature covers sha256(header bytes) --
/// the curve's message contract is exactly 32 bytes.
pub const HEADER_DIGEST_LENGTH: usize = 32;

/// Nonce length in bytes of raw entropy per transaction. Twice the 64-bit
/// floor required to make accidental collision negligible.
pub const NONCE_LENGTH: usize = 16;
