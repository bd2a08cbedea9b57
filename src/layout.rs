//! This module contains the representation of compiler-produced storage
//! layouts.
//!
//! Two forms exist. The *wire* form ([`StorageLayout`]) mirrors the JSON that
//! `solc` emits under `storageLayout` field-for-field, so existing compiler
//! tooling interoperates with it directly. The *resolved* form ([`Layout`])
//! is produced once, up front, by [`StorageLayout::resolve`]: every type
//! entry is classified into the [`TypeVariant`] sum type, every slot index
//! and byte count is parsed into a 256-bit integer, and every type reference
//! is checked against the dictionary. The decoder only ever works against the
//! resolved form, so it never re-inspects field presence and never encounters
//! a dangling reference it did not choose to tolerate.

use std::collections::BTreeMap;

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::{error::LayoutError, slot::Slot};

/// The wire form of a compiler-produced storage layout: an ordered sequence
/// of declared variables plus the type dictionary they reference.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StorageLayout {
    /// The declared variables, in declaration order.
    pub storage: Vec<StorageItem>,

    /// The type dictionary, keyed by type reference string
    /// (e.g. `t_uint256`).
    pub types: BTreeMap<String, TypeItem>,
}

/// One declared variable (or struct member) in the wire form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageItem {
    /// The AST node identifier the compiler attaches, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_id: Option<u64>,

    /// The fully-qualified contract the declaration belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,

    /// The declared identifier.
    pub label: String,

    /// The byte offset of the variable within its slot (0–31).
    pub offset: usize,

    /// The slot index as a decimal string; absolute for top-level variables,
    /// relative to the enclosing struct's base slot for members.
    pub slot: String,

    /// The type reference key into [`StorageLayout::types`].
    #[serde(rename = "type")]
    pub typ: String,
}

/// One entry of the wire form's type dictionary.
///
/// The compiler distinguishes the four kinds of type by which optional fields
/// are present; [`TypeItem::resolve`] performs that classification exactly
/// once.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeItem {
    /// The compiler's encoding discriminator (`inplace`, `mapping`, `bytes`
    /// or `dynamic_array`). Carried for round-tripping; classification uses
    /// field presence, as the discriminator is absent from some producers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// The human-readable type name (e.g. `uint256`, `struct A.S`).
    pub label: String,

    /// The storage footprint of the type, in bytes, as a decimal string.
    pub number_of_bytes: String,

    /// For struct types, the ordered member declarations with slot indices
    /// relative to the struct's base slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<StorageItem>>,

    /// For mapping types, the key type reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// For mapping types, the value type reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// For dynamic array types, the element type reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl StorageLayout {
    /// Parses the wire form from the compiler's JSON output.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves the wire form into the representation the decoder works
    /// against.
    ///
    /// Every type reference reachable from the layout — declared variables,
    /// struct members, mapping keys and values, array element types — is
    /// validated against the dictionary here, so a dangling reference
    /// surfaces as [`LayoutError::UnknownTypeReference`] before any storage
    /// is read.
    pub fn resolve(&self) -> Result<Layout, LayoutError> {
        let mut types = BTreeMap::new();
        for (reference, item) in &self.types {
            types.insert(reference.clone(), item.resolve()?);
        }

        let variables = self
            .storage
            .iter()
            .map(|item| {
                Ok(Variable {
                    label: item.label.clone(),
                    slot: Slot::from_decimal(&item.slot)?,
                    offset: item.offset,
                    typ: item.typ.clone(),
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;

        let layout = Layout { variables, types };
        layout.check_references()?;

        Ok(layout)
    }
}

impl TypeItem {
    /// Classifies this entry into its [`TypeVariant`] and parses its numeric
    /// fields.
    fn resolve(&self) -> Result<TypeDescriptor, LayoutError> {
        let number_of_bytes = U256::from_str_radix(&self.number_of_bytes, 10)
            .map_err(|_| LayoutError::InvalidByteCount(self.number_of_bytes.clone()))?;

        let variant = if let (Some(key), Some(value)) = (&self.key, &self.value) {
            TypeVariant::Mapping {
                key: key.clone(),
                value: value.clone(),
            }
        } else if let Some(base) = &self.base {
            TypeVariant::DynamicArray { base: base.clone() }
        } else if let Some(members) = &self.members {
            let members = members
                .iter()
                .map(|member| {
                    Ok(Member {
                        label: member.label.clone(),
                        relative_slot: Slot::from_decimal(&member.slot)?.0,
                        offset: member.offset,
                        typ: member.typ.clone(),
                    })
                })
                .collect::<Result<Vec<_>, LayoutError>>()?;
            TypeVariant::Struct { members }
        } else {
            TypeVariant::Value
        };

        Ok(TypeDescriptor {
            label: self.label.clone(),
            number_of_bytes,
            variant,
        })
    }
}

/// The resolved form of a storage layout.
///
/// It is immutable once built; decode sessions borrow it read-only, so any
/// number of concurrent decodes can share one resolved layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    variables: Vec<Variable>,
    types: BTreeMap<String, TypeDescriptor>,
}

impl Layout {
    /// Parses and resolves a layout straight from the compiler's JSON
    /// output.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        StorageLayout::from_json(json)?.resolve()
    }

    /// Gets the declared variables, in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Gets the first declared variable whose label is exactly `label`.
    #[must_use]
    pub fn variable(&self, label: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.label == label)
    }

    /// Looks up a type descriptor by its reference key.
    #[must_use]
    pub fn type_descriptor(&self, reference: &str) -> Option<&TypeDescriptor> {
        self.types.get(reference)
    }

    /// Checks that every type reference reachable from the layout has an
    /// entry in the dictionary.
    fn check_references(&self) -> Result<(), LayoutError> {
        let check = |reference: &String| {
            if self.types.contains_key(reference) {
                Ok(())
            } else {
                Err(LayoutError::UnknownTypeReference(reference.clone()))
            }
        };

        for variable in &self.variables {
            check(&variable.typ)?;
        }
        for descriptor in self.types.values() {
            match &descriptor.variant {
                TypeVariant::Value => {}
                TypeVariant::Struct { members } => {
                    for member in members {
                        check(&member.typ)?;
                    }
                }
                TypeVariant::Mapping { key, value } => {
                    check(key)?;
                    check(value)?;
                }
                TypeVariant::DynamicArray { base } => check(base)?,
            }
        }

        Ok(())
    }
}

/// A resolved declared variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variable {
    /// The declared identifier.
    pub label: String,

    /// The absolute slot the variable starts at.
    pub slot: Slot,

    /// The byte offset of the variable within its slot.
    ///
    /// This is nonzero only for packed declarations; leaf decoding interprets
    /// the whole fetched word, leaving sub-word narrowing to the caller.
    pub offset: usize,

    /// The type reference key for the variable's type.
    pub typ: String,
}

/// A resolved type descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDescriptor {
    /// The human-readable type name.
    pub label: String,

    /// The storage footprint of the type, in bytes.
    pub number_of_bytes: U256,

    /// Which of the four kinds of type this is, and its kind-specific data.
    pub variant: TypeVariant,
}

/// The four kinds of storage type the decoder understands, classified once
/// at resolution time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeVariant {
    /// A scalar or blob leaf; dispatch is by [`TypeDescriptor::label`].
    Value,

    /// A struct with its ordered member declarations.
    Struct {
        /// The members, with slots relative to the struct's base slot.
        members: Vec<Member>,
    },

    /// A mapping. Storage alone cannot enumerate its keys, so decoding one
    /// yields an empty placeholder.
    Mapping {
        /// The key type reference.
        key: String,
        /// The value type reference.
        value: String,
    },

    /// A dynamically-sized array; the element count lives in the array's own
    /// slot.
    DynamicArray {
        /// The element type reference.
        base: String,
    },
}

/// A resolved struct member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    /// The member's identifier.
    pub label: String,

    /// The member's slot, relative to the enclosing struct's base slot.
    pub relative_slot: U256,

    /// The byte offset of the member within its slot.
    pub offset: usize,

    /// The type reference key for the member's type.
    pub typ: String,
}
