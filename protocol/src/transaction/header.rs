//! Transaction header: the envelope metadata that actually gets signed.
//!
//! The header never contains the payload -- only its SHA-512 digest. That
//! keeps header size bounded by the address sets and lets the signature be
//! checked without the payload in hand (and the payload checked against the
//! header without re-verifying the signature).

use serde::{Deserialize, Serialize};

use crate::wire::{put_str, put_str_seq, DecodeError, Reader};

/// The transaction header fields, in canonical encoding order.
///
/// Invariants the builder upholds and the verifier checks:
///
/// - `payload_sha512` equals the hex SHA-512 of the envelope's payload bytes,
///   computed at construction time and never after;
/// - `inputs`/`outputs` are sorted and deduplicated (address *sets*, encoded
///   deterministically);
/// - `nonce` is unique per transaction, so two otherwise-identical requests
///   never collide on their header bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Transaction family namespace on the ledger.
    pub family_name: String,
    /// Family schema compatibility tag.
    pub family_version: String,
    /// State addresses (or address prefixes) this transaction may read.
    pub inputs: Vec<String>,
    /// State addresses (or address prefixes) this transaction may write.
    pub outputs: Vec<String>,
    /// Hex compressed public key of the signing agent.
    pub signer_public_key: String,
    /// Hex compressed public key of the batcher that will wrap this
    /// transaction for submission.
    pub batcher_public_key: String,
    /// Header signatures of transactions that must commit first.
    pub dependencies: Vec<String>,
    /// Hex SHA-512 of the payload bytes.
    pub payload_sha512: String,
    /// Per-transaction random token.
    pub nonce: String,
}

impl TransactionHeader {
    /// Canonical header bytes -- the exact message whose sha256 gets signed.
    ///
    /// Field order is fixed by this struct's declaration order; every string
    /// is length-prefixed, every sequence counted. Same fields in, same
    /// bytes out, forever.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        put_str(&mut buf, &self.family_name);
        put_str(&mut buf, &self.family_version);
        put_str_seq(&mut buf, &self.inputs);
        put_str_seq(&mut buf, &self.outputs);
        put_str(&mut buf, &self.signer_public_key);
        put_str(&mut buf, &self.batcher_public_key);
        put_str_seq(&mut buf, &self.dependencies);
        put_str(&mut buf, &self.payload_sha512);
        put_str(&mut buf, &self.nonce);
        buf
    }

    /// Decode canonical header bytes, rejecting truncation and trailing
    /// garbage.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let header = Self {
            family_name: reader.read_str()?,
            family_version: reader.read_str()?,
            inputs: reader.read_str_seq()?,
            outputs: reader.read_str_seq()?,
            signer_public_key: reader.read_str()?,
            batcher_public_key: reader.read_str()?,
            dependencies: reader.read_str_seq()?,
            payload_sha512: reader.read_str()?,
            nonce: reader.read_str()?,
        };
        reader.finish()?;
        Ok(header)
    }
}
