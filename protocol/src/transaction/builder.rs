//! Transaction construction: from an action request to a signed envelope.
//!
//! [`TransactionBuilder`] takes everything a transaction *requires* in its
//! constructor -- registry, action, parameters, signer, batcher -- so a
//! half-configured builder is unrepresentable. Dependencies, timestamp, and
//! nonce are the only optional knobs (the latter two exist for tests; in
//! production both are captured fresh at build time).
//!
//! The build is all-or-nothing and ordered so that nothing touches the
//! signing key until the request has fully proven itself: resolve, validate,
//! route addresses, encode payload -- only then digest, nonce, header, sign.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::addressing::{
    agent_address, property_address_range, record_address, record_type_address,
};
use crate::config::{FAMILY_NAME, FAMILY_VERSION, NONCE_LENGTH};
use crate::crypto::hash::{sha256, sha512_hex};
use crate::crypto::keys::{secure_random, KeyError, KeyPair, PublicKey};
use crate::payload::{encode_payload, validate_parameters, ActionParameters, ParameterError};
use crate::registry::{ActionDescriptor, ActionKind, ActionRegistry, UnknownAction};
use crate::transaction::header::TransactionHeader;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a transaction could not be built. Nothing here is retried internally:
/// every variant except the entropy failure reproduces deterministically
/// from the same inputs.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The requested action is not in the registry.
    #[error(transparent)]
    UnknownAction(#[from] UnknownAction),

    /// The parameters do not fit the action's declared layout.
    #[error("malformed action: {0}")]
    MalformedAction(#[from] ParameterError),

    /// The signing backend rejected the key or digest. Surfaced unchanged.
    #[error("signing failed: {0}")]
    Signing(#[from] KeyError),

    /// The OS entropy source would not produce nonce bytes. A caller may
    /// retry this one; we will not paper over it with weaker randomness.
    #[error("secure random source unavailable")]
    RandomSourceUnavailable,
}

// ---------------------------------------------------------------------------
// Transaction envelope
// ---------------------------------------------------------------------------

/// A finished, signed transaction envelope.
///
/// `header` holds the exact canonical bytes that were signed --
/// `header_signature` is ECDSA over `sha256(header)`, hex-encoded, and that
/// hex string is also the transaction's identifier (it is what dependency
/// lists reference). Mutating any field after construction produces an
/// envelope [`super::verify_transaction`] will reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Canonical header bytes.
    #[serde(with = "hex::serde")]
    pub header: Vec<u8>,
    /// Hex compact ECDSA signature over sha256(header).
    pub header_signature: String,
    /// Canonical payload bytes; the header binds their SHA-512.
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
}

impl Transaction {
    /// The transaction identifier: the header signature hex.
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode the header fields out of the canonical bytes.
    pub fn decode_header(&self) -> Result<TransactionHeader, crate::wire::DecodeError> {
        TransactionHeader::decode(&self.header)
    }
}

// ---------------------------------------------------------------------------
// Address routing
// ---------------------------------------------------------------------------

/// Compute the input/output address sets an action touches.
///
/// Pure function of (action, parameters, signer): the same logical request
/// always declares the same ledger locations. The signer's agent address
/// joins the inputs of every action -- the processor reads the acting agent
/// no matter what -- and the action-specific addresses are both read and
/// written. Record-scoped actions cover the record's whole property space
/// via the 44-char range prefix rather than enumerating pages.
fn route_addresses(
    descriptor: &ActionDescriptor,
    parameters: &ActionParameters,
    signer_public_key_hex: &str,
) -> Result<(Vec<String>, Vec<String>), ParameterError> {
    let signer_address = agent_address(signer_public_key_hex);

    let touched: Vec<String> = match descriptor.kind {
        ActionKind::CreateAgent => vec![signer_address.clone()],
        ActionKind::CreateRecord => {
            let record_id = require_str(parameters, "record_id")?;
            let record_type = require_str(parameters, "record_type")?;
            vec![
                record_address(record_id),
                property_address_range(record_id),
                record_type_address(record_type),
            ]
        }
        ActionKind::CreateRecordType => {
            let name = require_str(parameters, "name")?;
            vec![record_type_address(name)]
        }
        ActionKind::UpdateProperties => {
            let record_id = require_str(parameters, "record_id")?;
            vec![record_address(record_id), property_address_range(record_id)]
        }
        ActionKind::FinalizeRecord => {
            let record_id = require_str(parameters, "record_id")?;
            vec![record_address(record_id)]
        }
    };

    let mut inputs = touched.clone();
    inputs.push(signer_address);
    let mut outputs = touched;

    // Sets, not lists: sorted + deduplicated so header bytes stay canonical.
    inputs.sort_unstable();
    inputs.dedup();
    outputs.sort_unstable();
    outputs.dedup();

    Ok((inputs, outputs))
}

fn require_str<'p>(
    parameters: &'p ActionParameters,
    field: &str,
) -> Result<&'p str, ParameterError> {
    match parameters.get(field) {
        Some(value) => value.as_str().ok_or_else(|| ParameterError::TypeMismatch {
            field: field.to_string(),
            expected: crate::registry::FieldType::Str,
            actual: value.field_type(),
        }),
        None => Err(ParameterError::MissingField(field.to_string())),
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Builder for signed transaction envelopes.
///
/// # Usage
///
/// ```rust,no_run
/// use provenance_protocol::crypto::KeyPair;
/// use provenance_protocol::payload::ActionParameters;
/// use provenance_protocol::registry::ActionRegistry;
/// use provenance_protocol::transaction::TransactionBuilder;
///
/// let registry = ActionRegistry::bundled().unwrap();
/// let signer = KeyPair::generate().unwrap();
/// let batcher = KeyPair::generate().unwrap().public_key();
///
/// let tx = TransactionBuilder::new(
///     &registry,
///     "create_agent",
///     ActionParameters::new().with("name", "Alice"),
///     &signer,
///     &batcher,
/// )
/// .build()
/// .unwrap();
/// ```
pub struct TransactionBuilder<'a> {
    registry: &'a ActionRegistry,
    action: &'a str,
    parameters: ActionParameters,
    signer: &'a KeyPair,
    batcher: &'a PublicKey,
    dependencies: Vec<String>,
    timestamp: Option<u64>,
    nonce: Option<String>,
}

impl<'a> TransactionBuilder<'a> {
    /// Start a build. Everything a valid transaction requires is a
    /// constructor argument; there is no half-initialized state to forget.
    pub fn new(
        registry: &'a ActionRegistry,
        action: &'a str,
        parameters: ActionParameters,
        signer: &'a KeyPair,
        batcher: &'a PublicKey,
    ) -> Self {
        Self {
            registry,
            action,
            parameters,
            signer,
            batcher,
            dependencies: Vec::new(),
            timestamp: None,
            nonce: None,
        }
    }

    /// Declare prior transactions (by header-signature id) that must commit
    /// before this one. Order is preserved.
    pub fn dependencies(mut self, ids: Vec<String>) -> Self {
        self.dependencies = ids;
        self
    }

    /// Add a single dependency.
    pub fn dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Override the timestamp (integer seconds). Tests only -- a fixed
    /// timestamp plus a fixed nonce makes header bytes reproducible.
    pub fn timestamp(mut self, seconds: u64) -> Self {
        self.timestamp = Some(seconds);
        self
    }

    /// Override the nonce. Tests only, same reasoning as [`Self::timestamp`].
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Run the build: resolve → validate → route → encode → digest →
    /// nonce/timestamp → header → sign → envelope.
    ///
    /// Fails before the signing key is touched if the action is unknown or
    /// the parameters don't fit its schema. Never returns a partial
    /// transaction.
    pub fn build(self) -> Result<Transaction, BuildError> {
        // 1. Resolve the action against the registry.
        let descriptor = self.registry.resolve(self.action)?;

        // 2. Validate parameters, then derive the address sets. Validation
        //    first: routing reads typed fields and deserves clean inputs.
        validate_parameters(descriptor, &self.parameters)?;
        let signer_public_key = self.signer.public_key_hex();
        let (inputs, outputs) =
            route_addresses(descriptor, &self.parameters, &signer_public_key)?;

        // 3. Encode the payload and bind it by digest.
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| Utc::now().timestamp() as u64);
        let payload = encode_payload(descriptor, timestamp, &self.parameters)?;
        let payload_sha512 = sha512_hex(&payload);

        // 4. Fresh per-transaction nonce.
        let nonce = match self.nonce {
            Some(nonce) => nonce,
            None => hex::encode(
                secure_random::<NONCE_LENGTH>()
                    .map_err(|_| BuildError::RandomSourceUnavailable)?,
            ),
        };

        // 5. Assemble and encode the header.
        let header = TransactionHeader {
            family_name: FAMILY_NAME.to_string(),
            family_version: FAMILY_VERSION.to_string(),
            inputs,
            outputs,
            signer_public_key,
            batcher_public_key: self.batcher.to_hex(),
            dependencies: self.dependencies,
            payload_sha512,
            nonce,
        };
        let header_bytes = header.encode();

        // 6. Sign the header digest.
        let signature = self.signer.sign_digest(&sha256(&header_bytes))?;

        tracing::debug!(
            action = %descriptor.name,
            code = descriptor.code,
            inputs = header.inputs.len(),
            outputs = header.outputs.len(),
            payload_bytes = payload.len(),
            id = %signature.to_hex(),
            "built transaction envelope"
        );

        // 7. The finished envelope.
        Ok(Transaction {
            header: header_bytes,
            header_signature: signature.to_hex(),
            payload,
        })
    }
}

/// One-call convenience over [`TransactionBuilder`].
pub fn build_transaction(
    registry: &ActionRegistry,
    action: &str,
    parameters: ActionParameters,
    signer: &KeyPair,
    batcher: &PublicKey,
    dependencies: Vec<String>,
) -> Result<Transaction, BuildError> {
    TransactionBuilder::new(registry, action, parameters, signer, batcher)
        .dependencies(dependencies)
        .build()
}
