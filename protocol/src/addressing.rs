//! # Ledger Addressing
//!
//! Deterministic derivation of the 70-hex-character state addresses this
//! family reads and writes.
//!
//! An address is `namespace (6) + infix (2) + identity tail (62)`:
//!
//! - the **namespace** is `sha512(family_name)` truncated to 6 hex chars, so
//!   every participant derives the same prefix from the family name alone;
//! - the **infix** selects the address space (agent, record, property,
//!   proposal, record type);
//! - the **tail** is sha512 of the entity's identifying material, truncated
//!   to fill the remaining 62 chars. Property addresses split the tail
//!   further into record / property-name / page segments so that one record's
//!   properties share a common 44-char prefix.
//!
//! Determinism is the entire point: any client or validator given the same
//! inputs must land on the same address, every time. All functions here are
//! pure -- no I/O, no clocks, no randomness.

use std::fmt;
use std::sync::OnceLock;

use crate::config::{
    ADDRESS_TAIL_LENGTH, AGENT_INFIX, FAMILY_NAME, INFIX_LENGTH, NAMESPACE_LENGTH,
    PROPERTY_INFIX, PROPOSAL_INFIX, RECORD_INFIX, RECORD_TYPE_INFIX,
};
use crate::crypto::hash::{namespace_prefix, sha512_hex};

/// Tail segment width for the record part of property/proposal addresses.
const RANGE_TAIL_LENGTH: usize = 36;

/// Tail segment width for the property-name part of a property address.
const PROPERTY_NAME_LENGTH: usize = 22;

/// Tail segment width for the agent part of a proposal address.
const PROPOSAL_AGENT_LENGTH: usize = 26;

/// Width of the hex page-number suffix on property addresses.
const PAGE_NUMBER_LENGTH: usize = 4;

/// The family's namespace prefix, computed once per process.
///
/// The value is a pure function of [`FAMILY_NAME`]; the `OnceLock` only
/// spares us re-hashing on every address derivation.
pub fn namespace() -> &'static str {
    static NAMESPACE: OnceLock<String> = OnceLock::new();
    NAMESPACE.get_or_init(|| namespace_prefix(FAMILY_NAME))
}

/// sha512 hex of an identifier, truncated to `len` characters.
fn hash_tail(identifier: &str, len: usize) -> String {
    let mut digest = sha512_hex(identifier.as_bytes());
    digest.truncate(len);
    digest
}

/// Address of an agent, keyed by the hex of their compressed public key.
pub fn agent_address(public_key_hex: &str) -> String {
    format!(
        "{}{}{}",
        namespace(),
        AGENT_INFIX,
        hash_tail(public_key_hex, ADDRESS_TAIL_LENGTH)
    )
}

/// Address of a record, keyed by its external identifier.
pub fn record_address(record_id: &str) -> String {
    format!(
        "{}{}{}",
        namespace(),
        RECORD_INFIX,
        hash_tail(record_id, ADDRESS_TAIL_LENGTH)
    )
}

/// Address of a record type, keyed by its name.
pub fn record_type_address(type_name: &str) -> String {
    format!(
        "{}{}{}",
        namespace(),
        RECORD_TYPE_INFIX,
        hash_tail(type_name, ADDRESS_TAIL_LENGTH)
    )
}

/// The 44-char prefix shared by every property address under one record.
///
/// Header input/output sets list this range instead of enumerating each
/// property address -- the ledger treats a prefix as covering everything
/// beneath it, which is exactly what "this transaction may touch any of the
/// record's properties" needs.
pub fn property_address_range(record_id: &str) -> String {
    format!(
        "{}{}{}",
        namespace(),
        PROPERTY_INFIX,
        hash_tail(record_id, RANGE_TAIL_LENGTH)
    )
}

/// Address of one page of a named property under a record.
///
/// Page 0 is the property's canonical address; pages ≥ 1 hold the paginated
/// history of reported values.
pub fn property_address(record_id: &str, property_name: &str, page: u32) -> String {
    format!(
        "{}{}{:0width$x}",
        property_address_range(record_id),
        hash_tail(property_name, PROPERTY_NAME_LENGTH),
        page,
        width = PAGE_NUMBER_LENGTH
    )
}

/// Address of a transfer proposal between a record and a receiving agent.
pub fn proposal_address(record_id: &str, agent_id: &str) -> String {
    format!(
        "{}{}{}{}",
        namespace(),
        PROPOSAL_INFIX,
        hash_tail(record_id, RANGE_TAIL_LENGTH),
        hash_tail(agent_id, PROPOSAL_AGENT_LENGTH)
    )
}

// ---------------------------------------------------------------------------
// Address classification
// ---------------------------------------------------------------------------

/// Which address space a ledger address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Agent,
    Record,
    Property,
    PropertyPage,
    Proposal,
    RecordType,
    /// Not under this family's namespace at all.
    OtherFamily,
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Agent => "agent",
            Self::Record => "record",
            Self::Property => "property",
            Self::PropertyPage => "property-page",
            Self::Proposal => "proposal",
            Self::RecordType => "record-type",
            Self::OtherFamily => "other-family",
        };
        write!(f, "{}", name)
    }
}

/// Classify an arbitrary ledger address.
///
/// Anything outside the family namespace is [`AddressSpace::OtherFamily`];
/// within it, the infix decides. A property address whose page suffix is
/// non-zero classifies as [`AddressSpace::PropertyPage`].
pub fn address_space(address: &str) -> AddressSpace {
    if !address.starts_with(namespace()) || address.len() < NAMESPACE_LENGTH + INFIX_LENGTH {
        return AddressSpace::OtherFamily;
    }

    let infix = &address[NAMESPACE_LENGTH..NAMESPACE_LENGTH + INFIX_LENGTH];
    match infix {
        _ if infix == AGENT_INFIX => AddressSpace::Agent,
        _ if infix == RECORD_INFIX => AddressSpace::Record,
        _ if infix == PROPERTY_INFIX => {
            if address.ends_with("0000") {
                AddressSpace::Property
            } else {
                AddressSpace::PropertyPage
            }
        }
        _ if infix == PROPOSAL_INFIX => AddressSpace::Proposal,
        _ if infix == RECORD_TYPE_INFIX => AddressSpace::RecordType,
        _ => AddressSpace::OtherFamily,
    }
}
