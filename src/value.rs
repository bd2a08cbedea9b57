//! This module contains the typed value tree produced by a decode, and the
//! `{ type, value }` pair shape the public query API returns.

use ethnum::U256;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize,
    Serializer,
};

/// A decoded storage value.
///
/// Composite variants preserve declaration order: struct fields appear in
/// member-declaration order and array elements in index order. The
/// [`Value::Mapping`] variant is deliberately empty — mapping keys cannot be
/// enumerated from layout and storage alone, so mappings decode to a
/// placeholder by design.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// An unsigned integer of up to 256 bits.
    Uint(U256),

    /// A boolean.
    Bool(bool),

    /// An address, rendered as its checksum-cased hex string.
    Address(String),

    /// UTF-8 text.
    String(String),

    /// An opaque byte sequence.
    Bytes(Vec<u8>),

    /// A dynamic array's elements, in index order.
    Array(Vec<Value>),

    /// A struct's fields as `(label, value)` pairs, in declaration order.
    Struct(Vec<(String, Value)>),

    /// The empty placeholder produced for mapping types.
    Mapping,
}

impl Value {
    /// Gets the integer value, if this is an unsigned integer.
    #[must_use]
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// Gets the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Gets the textual form, if this is a string or an address.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Address(text) | Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Gets the raw bytes, if this is a byte sequence.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Gets the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Gets the field named `label`, if this is a struct that has one.
    #[must_use]
    pub fn field(&self, label: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields
                .iter()
                .find(|(name, _)| name == label)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl Serialize for Value {
    /// Serializes the value tree to the JSON-friendly shapes clients expect:
    /// `0x`-prefixed hex strings for integers and byte sequences, objects in
    /// declaration order for structs, an empty object for mappings.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Uint(value) => {
                let mut rendered = String::from("0x");
                rendered.push_str(&hex::encode(value.to_be_bytes()));
                serializer.serialize_str(&rendered)
            }
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Address(text) | Self::String(text) => serializer.serialize_str(text),
            Self::Bytes(bytes) => {
                let mut rendered = String::from("0x");
                rendered.push_str(&hex::encode(bytes));
                serializer.serialize_str(&rendered)
            }
            Self::Array(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (label, value) in fields {
                    map.serialize_entry(label, value)?;
                }
                map.end()
            }
            Self::Mapping => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

/// The result of decoding one declared variable: the type's human-readable
/// label alongside the decoded value.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DecodedVariable {
    /// The human-readable type name from the layout's type dictionary.
    #[serde(rename = "type")]
    pub typ: String,

    /// The decoded value tree.
    pub value: Value,
}
