//! # Action Registry
//!
//! The closed set of actions this client can address, plus the schema that
//! says how each one's parameters are laid out on the wire.
//!
//! Two sources of truth cooperate here:
//!
//! - [`ActionKind`] is a **closed enum**. Adding an action is a code change,
//!   and every `match` over kinds is checked for exhaustiveness at compile
//!   time. No stringly-typed dispatch.
//! - The **schema artifact** (`schema/actions.json`, embedded at compile
//!   time) carries the versioned data half: wire codes and field layouts.
//!   It is parsed exactly once, validated against the configured family and
//!   the known kinds, and the resulting [`ActionRegistry`] is read-only for
//!   the life of the process. Lookups never touch the filesystem.
//!
//! The registry is an explicit value, not a global. Whoever builds
//! transactions holds one and passes it down -- which is also what makes the
//! codec testable against hand-rolled schemas.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{FAMILY_NAME, FAMILY_VERSION, SCHEMA_ARTIFACT_VERSION};

/// The bundled schema artifact, compiled into the binary.
const BUNDLED_SCHEMA: &str = include_str!("../schema/actions.json");

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction performs against the family.
///
/// Closed on purpose: the ledger-side processor understands exactly these,
/// so an open-ended set here would only defer failures to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Register the signing agent under their public key.
    CreateAgent,
    /// Create a tracked record of an existing record type.
    CreateRecord,
    /// Define a new record type and its property layout.
    CreateRecordType,
    /// Report new values for a record's properties.
    UpdateProperties,
    /// Close a record against further updates.
    FinalizeRecord,
}

impl ActionKind {
    /// The action's registry name -- the string callers use to request it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAgent => "create_agent",
            Self::CreateRecord => "create_record",
            Self::CreateRecordType => "create_record_type",
            Self::UpdateProperties => "update_properties",
            Self::FinalizeRecord => "finalize_record",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "create_agent" => Some(Self::CreateAgent),
            "create_record" => Some(Self::CreateRecord),
            "create_record_type" => Some(Self::CreateRecordType),
            "update_properties" => Some(Self::UpdateProperties),
            "finalize_record" => Some(Self::FinalizeRecord),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Field schema
// ---------------------------------------------------------------------------

/// Wire type of a single action parameter.
///
/// Composite structures (property-value lists, type schemas) travel as
/// `Bytes`: a pre-encoded sub-message this codec carries opaquely and the
/// family processor decodes on its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Str,
    U64,
    I64,
    Bool,
    Bytes,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "str",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
        };
        write!(f, "{}", name)
    }
}

/// One field in an action's parameter layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within the action.
    pub name: String,
    /// Declared wire type.
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Whether the field must be present. Optional fields encode a presence
    /// marker; absent means absent, never a silently-invented default.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// The resolved schema of one action: its kind, wire code, and ordered
/// field layout. Field order is the canonical encoding order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub name: String,
    pub code: u32,
    pub fields: Vec<FieldSpec>,
}

impl ActionDescriptor {
    /// Look up a field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The requested action is not in the registry. Caller error; retrying the
/// same name will deterministically fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

/// Startup-only failures loading the schema artifact. Any of these is fatal
/// to initialization -- a client with a half-understood schema would sign
/// garbage, so we refuse to start instead.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema artifact version `{found}` is not the supported `{expected}`")]
    VersionMismatch { expected: String, found: String },

    #[error("schema family `{found}` does not match the configured `{expected}`")]
    FamilyMismatch { expected: String, found: String },

    #[error("schema family version `{found}` does not match the configured `{expected}`")]
    FamilyVersionMismatch { expected: String, found: String },

    #[error("schema action `{0}` is not a recognized action kind")]
    UnknownKind(String),

    #[error("duplicate action name `{0}` in schema artifact")]
    DuplicateName(String),

    #[error("duplicate action code {0} in schema artifact")]
    DuplicateCode(u32),

    #[error("action `{action}` declares duplicate field `{field}`")]
    DuplicateField { action: String, field: String },

    #[error("action code 0 is reserved (action `{0}`)")]
    ReservedCode(String),
}

// ---------------------------------------------------------------------------
// Raw artifact layout (serde side)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawArtifact {
    schema_version: String,
    family: RawFamily,
    actions: Vec<RawAction>,
}

#[derive(Deserialize)]
struct RawFamily {
    name: String,
    version: String,
}

#[derive(Deserialize)]
struct RawAction {
    name: String,
    code: u32,
    fields: Vec<FieldSpec>,
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// The loaded, validated action registry.
///
/// Populated once, read-only afterwards; resolution is a pure table lookup.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: Vec<ActionDescriptor>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<u32, usize>,
    schema_version: String,
}

impl ActionRegistry {
    /// Load the schema artifact bundled with the crate.
    ///
    /// This is the registry every production caller wants. It can still fail:
    /// the artifact is data, and data that disagrees with the configured
    /// family or the known kinds must not make it past startup.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::from_json(BUNDLED_SCHEMA)
    }

    /// Parse and validate a schema artifact from its JSON source.
    ///
    /// Validation is strict: artifact version, family name/version, action
    /// kinds, and name/code/field uniqueness are all checked here so nothing
    /// downstream ever has to re-check them.
    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let artifact: RawArtifact = serde_json::from_str(raw)?;

        if artifact.schema_version != SCHEMA_ARTIFACT_VERSION {
            return Err(SchemaError::VersionMismatch {
                expected: SCHEMA_ARTIFACT_VERSION.to_string(),
                found: artifact.schema_version,
            });
        }
        if artifact.family.name != FAMILY_NAME {
            return Err(SchemaError::FamilyMismatch {
                expected: FAMILY_NAME.to_string(),
                found: artifact.family.name,
            });
        }
        if artifact.family.version != FAMILY_VERSION {
            return Err(SchemaError::FamilyVersionMismatch {
                expected: FAMILY_VERSION.to_string(),
                found: artifact.family.version,
            });
        }

        let mut actions = Vec::with_capacity(artifact.actions.len());
        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();

        for raw_action in artifact.actions {
            let kind = ActionKind::from_name(&raw_action.name)
                .ok_or_else(|| SchemaError::UnknownKind(raw_action.name.clone()))?;
            if raw_action.code == 0 {
                return Err(SchemaError::ReservedCode(raw_action.name));
            }

            for (i, field) in raw_action.fields.iter().enumerate() {
                if raw_action.fields[..i].iter().any(|f| f.name == field.name) {
                    return Err(SchemaError::DuplicateField {
                        action: raw_action.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }

            let index = actions.len();
            if by_name.insert(raw_action.name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateName(raw_action.name));
            }
            if by_code.insert(raw_action.code, index).is_some() {
                return Err(SchemaError::DuplicateCode(raw_action.code));
            }

            actions.push(ActionDescriptor {
                kind,
                name: raw_action.name,
                code: raw_action.code,
                fields: raw_action.fields,
            });
        }

        Ok(Self {
            actions,
            by_name,
            by_code,
            schema_version: artifact.schema_version,
        })
    }

    /// Resolve an action by its registry name.
    pub fn resolve(&self, name: &str) -> Result<&ActionDescriptor, UnknownAction> {
        self.by_name
            .get(name)
            .map(|&i| &self.actions[i])
            .ok_or_else(|| UnknownAction(name.to_string()))
    }

    /// Resolve an action by its wire code -- the decoder's entry point.
    pub fn resolve_code(&self, code: u32) -> Option<&ActionDescriptor> {
        self.by_code.get(&code).map(|&i| &self.actions[i])
    }

    /// All registered actions, in artifact order.
    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// The artifact version this registry was loaded from.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
