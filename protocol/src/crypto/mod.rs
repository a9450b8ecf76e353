//! # Cryptographic Primitives
//!
//! Everything security-related in this crate flows through here: the SHA-512
//! digests that bind payloads into headers and derive ledger addresses, the
//! SHA-256 digest the header signature covers, and secp256k1 ECDSA for the
//! signatures themselves.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **SHA-512** for payload digests and address material -- the digest the
//!   ledger's validators recompute, so there is no room for creativity.
//! - **SHA-256** for the signed header digest -- the curve's message contract
//!   is exactly 32 bytes.
//! - **secp256k1 ECDSA** with RFC 6979 deterministic nonces -- no per-signature
//!   randomness to get wrong, which is the only acceptable kind of ECDSA.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. If you're tempted to optimize these functions, please
//! reconsider. Then reconsider again.

pub mod hash;
pub mod keys;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy.
pub use hash::{sha256, sha512, sha512_hex};
pub use keys::{KeyError, KeyPair, PublicKey, Signature};
