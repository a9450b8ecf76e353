//! # Key Management & Signatures
//!
//! secp256k1 keypair handling for ledger identities.
//!
//! Every transaction carries two public keys (signer and batcher) and one
//! signature produced by the signer's secret key. This module wraps the
//! audited `secp256k1` implementation with the crate's own types so that key
//! and signature handling is uniform everywhere.
//!
//! ## Why secp256k1/ECDSA?
//!
//! Because the ledger's validators verify against it -- the public key point
//! encodings (33-byte compressed, 65-byte uncompressed) and the 64-byte
//! compact signatures are part of the wire contract, not a preference.
//! The one classic ECDSA footgun, per-signature randomness, is structurally
//! absent: signing uses RFC 6979 deterministic nonce derivation, so no RNG
//! is consulted at signing time and nonce reuse cannot happen.
//!
//! ## Security considerations
//!
//! - The caller owns the key material. This crate only borrows a [`KeyPair`]
//!   for the duration of a signing call and never persists it.
//! - Key generation draws from the OS CSPRNG via a fallible API. If the
//!   entropy source is unavailable you get [`KeyError::EntropyUnavailable`],
//!   never a silent fallback to something weaker.
//! - Secret bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::ecdsa::Signature as EcdsaSignature;
use secp256k1::{Message, PublicKey as SecpPublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{
    COMPRESSED_PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
    UNCOMPRESSED_PUBLIC_KEY_LENGTH,
};

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed -- leaking details about
/// key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: not a valid curve scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid curve point")]
    InvalidPublicKey,

    #[error("invalid signature bytes: expected {SIGNATURE_LENGTH} compact bytes")]
    InvalidSignature,

    #[error("signing backend rejected the digest")]
    SigningFailed,

    #[error("secure random source unavailable")]
    EntropyUnavailable,
}

/// Fill a fixed-size buffer from the OS CSPRNG, failing loudly.
///
/// The fallible `try_fill_bytes` path is deliberate: a dead entropy source
/// must surface as an error, not degrade into predictable nonces.
pub(crate) fn secure_random<const N: usize>() -> Result<[u8; N], KeyError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| KeyError::EntropyUnavailable)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A secp256k1 signing identity: secret scalar plus derived public point.
///
/// The secret key is the crown jewel. This crate never stores one -- a
/// `KeyPair` lives exactly as long as the caller lets it, and the only thing
/// the transaction builder does with it is one [`sign_digest`](Self::sign_digest)
/// call.
///
/// `KeyPair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Serializing secret keys should be a deliberate, conscious act, not
/// something that happens because a keypair ended up inside a JSON response.
/// Use [`secret_bytes`](Self::secret_bytes) / [`from_secret_bytes`](Self::from_secret_bytes)
/// explicitly.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: SecpPublicKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS CSPRNG.
    ///
    /// Draws 32 bytes and rejection-samples until they form a valid curve
    /// scalar. The retry branch fires with probability ~2^-128, but crypto
    /// code doesn't get to assume things are fine.
    pub fn generate() -> Result<Self, KeyError> {
        let secp = Secp256k1::new();
        loop {
            let candidate = secure_random::<SECRET_KEY_LENGTH>()?;
            if let Ok(secret) = SecretKey::from_slice(&candidate) {
                let public = SecpPublicKey::from_secret_key(&secp, &secret);
                return Ok(Self { secret, public });
            }
        }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    ///
    /// The public point is re-derived from the secret key, so the pair is
    /// consistent by construction. Fails if the bytes are not a valid scalar
    /// (zero, or ≥ the curve order).
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let public = SecpPublicKey::from_secret_key(&Secp256k1::new(), &secret);
        Ok(Self { secret, public })
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    ///
    /// Convenience for loading dev keys from the command line. Please don't
    /// put raw hex keys in shell history in production -- but for devnet,
    /// we're not going to pretend you won't do it anyway.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_secret_bytes(&arr)
    }

    /// The public half of this identity, safe to share with the world.
    pub fn public_key(&self) -> PublicKey {
        PublicKey { inner: self.public }
    }

    /// The compressed public key, hex-encoded -- the form that appears in
    /// transaction headers and agent addresses.
    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }

    /// Export the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** This is the only secret standing between
    /// an attacker and full control of the identity. Don't log it. Don't send
    /// it anywhere in plaintext.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.secret.secret_bytes()
    }

    /// Sign a 32-byte digest, producing a compact ECDSA signature.
    ///
    /// The nonce is derived per RFC 6979 from (key, digest) -- deterministic,
    /// so the same digest signed with the same key always yields the same
    /// signature, and there is no signing-time randomness to mismanage.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, KeyError> {
        let message =
            Message::from_digest_slice(digest).map_err(|_| KeyError::SigningFailed)?;
        let secp = Secp256k1::signing_only();
        let sig = secp.sign_ecdsa(&message, &self.secret);
        Ok(Signature {
            bytes: sig.serialize_compact(),
        })
    }

    /// Verify a signature over a digest against this keypair's public key.
    ///
    /// Convenience mirror of [`PublicKey::verify_digest`].
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        self.public_key().verify_digest(digest, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even partially.
        write!(f, "KeyPair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for KeyPair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a habit we refuse to form.
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
    }
}

impl Eq for KeyPair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A secp256k1 public key -- the on-ledger identity of a signer or batcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    inner: SecpPublicKey,
}

impl PublicKey {
    /// Parse a public key from its point encoding.
    ///
    /// Accepts either the 33-byte compressed or the 65-byte uncompressed
    /// form. Anything that is not a valid curve point is rejected -- some
    /// 33-byte strings simply aren't points, and using them downstream would
    /// be undefined nonsense.
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != COMPRESSED_PUBLIC_KEY_LENGTH
            && slice.len() != UNCOMPRESSED_PUBLIC_KEY_LENGTH
        {
            return Err(KeyError::InvalidPublicKey);
        }
        let inner = SecpPublicKey::from_slice(slice).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { inner })
    }

    /// Parse a hex-encoded public key (compressed or uncompressed form).
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_slice(&bytes)
    }

    /// The 33-byte compressed point encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        self.inner.serialize()
    }

    /// The 65-byte uncompressed point encoding.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH] {
        self.inner.serialize_uncompressed()
    }

    /// Hex of the compressed encoding -- 66 characters. This is the canonical
    /// textual form used in headers and address derivation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Verify a compact ECDSA signature over a 32-byte digest.
    ///
    /// Returns `true` only for a valid signature; `false` for everything
    /// else, including structurally broken signatures. Never panics, never
    /// errors -- the vast majority of callers want a yes/no answer, and a
    /// detailed failure oracle helps nobody but attackers.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        let Ok(message) = Message::from_digest_slice(digest) else {
            return false;
        };
        let Ok(sig) = EcdsaSignature::from_compact(&signature.bytes) else {
            return false;
        };
        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&message, &sig, &self.inner).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A compact ECDSA signature (r || s, 64 bytes).
///
/// Stored in compact form because that is what travels: the transaction
/// envelope carries the hex of these 64 bytes as the header signature, and
/// that hex string doubles as the transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "hex::serde")]
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    /// Wrap raw compact signature bytes. No curve math happens here;
    /// structural validity is checked at verification time.
    pub fn from_compact(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse a hex-encoded compact signature (128 characters).
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSignature)?;
        let arr: [u8; SIGNATURE_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { bytes: arr })
    }

    /// The raw compact bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Hex-encoded signature -- 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}
