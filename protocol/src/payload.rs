//! # Action Payload Codec
//!
//! Canonical encoding of action parameters into the payload bytes a
//! transaction header binds by digest.
//!
//! The layout is fixed by the action's [`ActionDescriptor`]:
//!
//! ```text
//! u32 LE  action code            -- the one-of discriminator
//! u64 LE  timestamp              -- integer seconds, never floating
//! u32 LE  field count            -- the schema's field count
//! per schema field, in declared order:
//!     u8  presence (0x00 absent / 0x01 present)
//!     u8  type tag + value bytes, when present
//! ```
//!
//! Identical logical input produces byte-identical output: field order comes
//! from the schema, not from any map's iteration whims, and every integer is
//! fixed-width. The embedded action code lets a decoder recover which action
//! variant it is looking at with nothing but a registry in hand.
//!
//! Validation happens before a single byte is produced. A missing required
//! field, a mistyped value, or a parameter the schema has never heard of is
//! a [`ParameterError`] -- never a silently-encoded default.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{ActionDescriptor, ActionRegistry, FieldType};
use crate::wire::{put_bytes, put_i64, put_str, put_u32, put_u64, DecodeError, Reader};

// Value tags on the wire. One per FieldType, stable forever.
const TAG_STR: u8 = 0x01;
const TAG_U64: u8 = 0x02;
const TAG_I64: u8 = 0x03;
const TAG_BOOL: u8 = 0x04;
const TAG_BYTES: u8 = 0x05;

const PRESENT: u8 = 0x01;
const ABSENT: u8 = 0x00;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A typed action parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionValue {
    Str(String),
    U64(u64),
    I64(i64),
    Bool(bool),
    Bytes(#[serde(with = "hex::serde")] Vec<u8>),
}

impl ActionValue {
    /// The wire type this value encodes as.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Str(_) => FieldType::Str,
            Self::U64(_) => FieldType::U64,
            Self::I64(_) => FieldType::I64,
            Self::Bool(_) => FieldType::Bool,
            Self::Bytes(_) => FieldType::Bytes,
        }
    }

    /// Borrow the string inside, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    fn wire_tag(&self) -> u8 {
        match self {
            Self::Str(_) => TAG_STR,
            Self::U64(_) => TAG_U64,
            Self::I64(_) => TAG_I64,
            Self::Bool(_) => TAG_BOOL,
            Self::Bytes(_) => TAG_BYTES,
        }
    }
}

impl fmt::Display for ActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::U64(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

impl From<&str> for ActionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ActionValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<u64> for ActionValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<i64> for ActionValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<bool> for ActionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<u8>> for ActionValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// The caller-supplied field-name → value mapping for one action request.
///
/// Created per request, validated against the action's descriptor, and
/// discarded after encoding. Insertion order does not matter -- the schema
/// decides encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameters {
    values: BTreeMap<String, ActionValue>,
}

impl ActionParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ActionValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style insert for literal construction.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ActionValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActionValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Why a set of action parameters cannot be encoded. Caller error -- the same
/// inputs will fail the same way every time, so nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("required field `{0}` is missing")]
    MissingField(String),

    #[error("field `{field}` expects `{expected}` but was given `{actual}`")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },

    #[error("`{0}` is not a field of this action")]
    UnknownField(String),
}

/// Check a parameter set against an action's declared layout.
///
/// Every failure mode is explicit: required-but-missing, declared-but-wrong
/// type, or supplied-but-undeclared. Optional fields may be absent; nothing
/// is ever defaulted on the caller's behalf.
pub fn validate_parameters(
    descriptor: &ActionDescriptor,
    parameters: &ActionParameters,
) -> Result<(), ParameterError> {
    for field in &descriptor.fields {
        match parameters.get(&field.name) {
            Some(value) if value.field_type() != field.ty => {
                return Err(ParameterError::TypeMismatch {
                    field: field.name.clone(),
                    expected: field.ty,
                    actual: value.field_type(),
                });
            }
            Some(_) => {}
            None if field.required => {
                return Err(ParameterError::MissingField(field.name.clone()));
            }
            None => {}
        }
    }

    for (name, _) in parameters.iter() {
        if descriptor.field(name).is_none() {
            return Err(ParameterError::UnknownField(name.to_string()));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Canonically encode a validated action into payload bytes.
///
/// The timestamp is integer seconds -- the resolution the ledger records, and
/// the only representation that stays canonical. Validation runs first; no
/// byte is produced for a parameter set the schema rejects.
pub fn encode_payload(
    descriptor: &ActionDescriptor,
    timestamp: u64,
    parameters: &ActionParameters,
) -> Result<Vec<u8>, ParameterError> {
    validate_parameters(descriptor, parameters)?;

    let mut buf = Vec::with_capacity(64);
    put_u32(&mut buf, descriptor.code);
    put_u64(&mut buf, timestamp);
    put_u32(&mut buf, descriptor.fields.len() as u32);

    for field in &descriptor.fields {
        match parameters.get(&field.name) {
            Some(value) => {
                buf.push(PRESENT);
                buf.push(value.wire_tag());
                match value {
                    ActionValue::Str(s) => put_str(&mut buf, s),
                    ActionValue::U64(v) => put_u64(&mut buf, *v),
                    ActionValue::I64(v) => put_i64(&mut buf, *v),
                    ActionValue::Bool(v) => buf.push(u8::from(*v)),
                    ActionValue::Bytes(b) => put_bytes(&mut buf, b),
                }
            }
            None => buf.push(ABSENT),
        }
    }

    Ok(buf)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded payload: which action, when, and with what values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Registry name of the decoded action.
    pub action: String,
    /// The wire code the payload carried.
    pub code: u32,
    /// Creation time, integer seconds since the Unix epoch.
    pub timestamp: u64,
    /// The recovered parameter values.
    pub parameters: ActionParameters,
}

/// Decode payload bytes against a registry.
///
/// The embedded action code selects the descriptor; the descriptor drives
/// the field walk. Every structural lie -- unknown code, wrong tag, short
/// buffer, trailing bytes -- is a [`DecodeError`].
pub fn decode_payload(registry: &ActionRegistry, bytes: &[u8]) -> Result<Payload, DecodeError> {
    let mut reader = Reader::new(bytes);

    let code = reader.read_u32()?;
    let descriptor = registry
        .resolve_code(code)
        .ok_or(DecodeError::UnknownActionCode(code))?;

    let timestamp = reader.read_u64()?;
    let field_count = reader.read_u32()? as usize;
    if field_count != descriptor.fields.len() {
        // Bytes produced against a different schema generation; the field
        // walk below would misparse, so stop here.
        return Err(DecodeError::FieldCountMismatch {
            expected: descriptor.fields.len(),
            actual: field_count,
        });
    }

    let mut parameters = ActionParameters::new();
    for field in &descriptor.fields {
        match reader.read_u8()? {
            ABSENT => continue,
            PRESENT => {}
            other => return Err(DecodeError::InvalidPresence(other)),
        }

        let tag = reader.read_u8()?;
        let expected_tag = match field.ty {
            FieldType::Str => TAG_STR,
            FieldType::U64 => TAG_U64,
            FieldType::I64 => TAG_I64,
            FieldType::Bool => TAG_BOOL,
            FieldType::Bytes => TAG_BYTES,
        };
        if tag != expected_tag {
            return Err(DecodeError::TagMismatch {
                field: field.name.clone(),
                expected: field.ty,
                actual: tag,
            });
        }

        let value = match field.ty {
            FieldType::Str => ActionValue::Str(reader.read_str()?),
            FieldType::U64 => ActionValue::U64(reader.read_u64()?),
            FieldType::I64 => ActionValue::I64(reader.read_i64()?),
            FieldType::Bool => match reader.read_u8()? {
                0x00 => ActionValue::Bool(false),
                0x01 => ActionValue::Bool(true),
                other => return Err(DecodeError::InvalidBool(other)),
            },
            FieldType::Bytes => ActionValue::Bytes(reader.read_bytes()?),
        };
        parameters.insert(field.name.clone(), value);
    }

    reader.finish()?;

    Ok(Payload {
        action: descriptor.name.clone(),
        code,
        timestamp,
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ActionRegistry {
        ActionRegistry::bundled().unwrap()
    }

    #[test]
    fn encoding_is_deterministic() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let params = ActionParameters::new().with("name", "Alice");

        let a = encode_payload(descriptor, 1_700_000_000, &params).unwrap();
        let b = encode_payload(descriptor, 1_700_000_000, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn insertion_order_does_not_change_the_bytes() {
        let registry = registry();
        let descriptor = registry.resolve("create_record").unwrap();

        let forward = ActionParameters::new()
            .with("record_id", "fish-0001")
            .with("record_type", "fish-pallet");
        let backward = ActionParameters::new()
            .with("record_type", "fish-pallet")
            .with("record_id", "fish-0001");

        assert_eq!(
            encode_payload(descriptor, 1, &forward).unwrap(),
            encode_payload(descriptor, 1, &backward).unwrap()
        );
    }

    #[test]
    fn payload_starts_with_code_and_timestamp() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let params = ActionParameters::new().with("name", "Alice");
        let bytes = encode_payload(descriptor, 0x0102_0304, &params).unwrap();

        assert_eq!(&bytes[..4], &descriptor.code.to_le_bytes());
        assert_eq!(&bytes[4..12], &0x0102_0304u64.to_le_bytes());
    }

    #[test]
    fn roundtrip_every_field_type() {
        // A hand-rolled schema exercising all five wire types at once.
        let raw = r#"{
            "schema_version": "1.0",
            "family": { "name": "paasforchain_adresser", "version": "0.01" },
            "actions": [
                { "name": "create_record", "code": 2, "fields": [
                    { "name": "record_id", "type": "str" },
                    { "name": "count", "type": "u64" },
                    { "name": "offset", "type": "i64" },
                    { "name": "sealed", "type": "bool" },
                    { "name": "blob", "type": "bytes" }
                ] }
            ]
        }"#;
        let registry = ActionRegistry::from_json(raw).unwrap();
        let descriptor = registry.resolve("create_record").unwrap();

        let params = ActionParameters::new()
            .with("record_id", "fish-0001")
            .with("count", 42u64)
            .with("offset", -7i64)
            .with("sealed", true)
            .with("blob", vec![0xCA, 0xFE, 0x00, 0xBA, 0xBE]);

        let bytes = encode_payload(descriptor, 1_700_000_000, &params).unwrap();
        let decoded = decode_payload(&registry, &bytes).unwrap();

        assert_eq!(decoded.action, "create_record");
        assert_eq!(decoded.code, 2);
        assert_eq!(decoded.timestamp, 1_700_000_000);
        assert_eq!(decoded.parameters, params);
    }

    #[test]
    fn roundtrip_with_optional_field_absent() {
        let registry = registry();
        let descriptor = registry.resolve("create_record").unwrap();
        let params = ActionParameters::new()
            .with("record_id", "fish-0001")
            .with("record_type", "fish-pallet");

        let bytes = encode_payload(descriptor, 5, &params).unwrap();
        let decoded = decode_payload(&registry, &bytes).unwrap();
        assert_eq!(decoded.parameters, params);
        assert!(decoded.parameters.get("properties").is_none());
    }

    #[test]
    fn missing_required_field_rejected() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let err = encode_payload(descriptor, 1, &ActionParameters::new()).unwrap_err();
        assert_eq!(err, ParameterError::MissingField("name".to_string()));
    }

    #[test]
    fn mistyped_field_rejected() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let params = ActionParameters::new().with("name", 99u64);
        let err = encode_payload(descriptor, 1, &params).unwrap_err();
        assert_eq!(
            err,
            ParameterError::TypeMismatch {
                field: "name".to_string(),
                expected: FieldType::Str,
                actual: FieldType::U64,
            }
        );
    }

    #[test]
    fn undeclared_field_rejected() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let params = ActionParameters::new()
            .with("name", "Alice")
            .with("favorite_color", "teal");
        let err = encode_payload(descriptor, 1, &params).unwrap_err();
        assert_eq!(
            err,
            ParameterError::UnknownField("favorite_color".to_string())
        );
    }

    #[test]
    fn decode_unknown_code_rejected() {
        let registry = registry();
        let mut bytes = Vec::new();
        crate::wire::put_u32(&mut bytes, 9999);
        crate::wire::put_u64(&mut bytes, 0);
        crate::wire::put_u32(&mut bytes, 0);
        assert_eq!(
            decode_payload(&registry, &bytes).unwrap_err(),
            DecodeError::UnknownActionCode(9999)
        );
    }

    #[test]
    fn decode_truncated_payload_rejected() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let params = ActionParameters::new().with("name", "Alice");
        let mut bytes = encode_payload(descriptor, 1, &params).unwrap();
        bytes.truncate(bytes.len() - 3);
        assert_eq!(
            decode_payload(&registry, &bytes).unwrap_err(),
            DecodeError::UnexpectedEnd
        );
    }

    #[test]
    fn decode_trailing_garbage_rejected() {
        let registry = registry();
        let descriptor = registry.resolve("create_agent").unwrap();
        let params = ActionParameters::new().with("name", "Alice");
        let mut bytes = encode_payload(descriptor, 1, &params).unwrap();
        bytes.push(0x00);
        assert!(matches!(
            decode_payload(&registry, &bytes).unwrap_err(),
            DecodeError::TrailingBytes(1)
        ));
    }

    #[test]
    fn timestamp_is_integer_seconds_in_the_bytes() {
        // Two encodings a second apart differ; two in the same second do not.
        let registry = registry();
        let descriptor = registry.resolve("finalize_record").unwrap();
        let params = ActionParameters::new().with("record_id", "r1");

        let at_t = encode_payload(descriptor, 1_700_000_000, &params).unwrap();
        let same_t = encode_payload(descriptor, 1_700_000_000, &params).unwrap();
        let next_t = encode_payload(descriptor, 1_700_000_001, &params).unwrap();
        assert_eq!(at_t, same_t);
        assert_ne!(at_t, next_t);
    }
}
