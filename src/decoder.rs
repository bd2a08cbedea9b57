//! This module implements the storage decoder itself: the leaf-level scalar
//! and blob decoders, the recursive structural walker over the resolved type
//! dictionary, and the public query API.
//!
//! # Decode Shape
//!
//! A decode is a tree of independent leaf reads. Struct members, dynamic
//! array elements and distinct top-level variables read disjoint slots, so
//! their reads are issued concurrently and joined; the only sequencing
//! constraint is that an array's own slot must be read (for the element
//! count) before its element slots can be derived. The decoder holds no
//! mutable state, so dropping an in-flight decode future abandons all
//! outstanding reads with nothing to roll back, and any number of decodes
//! may run concurrently against one layout and snapshot.
//!
//! # Failure Semantics
//!
//! No partial results are produced: if any member or element of a composite
//! fails to decode, the containing decode fails, and one failing variable
//! fails a whole [`Decoder::variables`] batch. This makes layout/version
//! mismatches loud instead of silently dropping data.

use ethnum::U256;
use futures::{
    future::{try_join_all, BoxFuture},
    FutureExt,
};
use tracing::{debug, trace};

use crate::{
    constant::{DEFAULT_MAX_NESTING_DEPTH, MAX_INLINE_BLOB_BYTES, WORD_SIZE_BYTES},
    error::DecodeError,
    layout::{Layout, TypeDescriptor, TypeVariant},
    slot::{Slot, Word},
    storage::StorageReader,
    utility::{checksum_address, to_usize},
    value::{DecodedVariable, Value},
};

/// The configuration for the decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// The maximum structural nesting depth to follow before failing the
    /// decode.
    ///
    /// Layouts are externally supplied, so recursion over them is bounded;
    /// exceeding the bound fails with [`DecodeError::NestingTooDeep`].
    pub max_nesting_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// The storage decoder for one resolved layout and one storage snapshot.
///
/// The decoder borrows both; it carries no session state of its own, so each
/// query is independent and the decoder can be freely shared.
#[derive(Debug)]
pub struct Decoder<'a, R: ?Sized> {
    layout: &'a Layout,
    reader: &'a R,
    config: Config,
}

impl<'a, R> Decoder<'a, R>
where
    R: StorageReader + Sync + ?Sized,
{
    /// Constructs a decoder over `layout` that reads through `reader`, with
    /// the default configuration.
    pub fn new(layout: &'a Layout, reader: &'a R) -> Self {
        Self {
            layout,
            reader,
            config: Config::default(),
        }
    }

    /// Replaces the decoder's configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Decodes the declared variable named `label`.
    ///
    /// The variable is located by exact label equality, taking the first
    /// match in declaration order.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::VariableNotFound`] if no declared variable has the
    ///   requested label.
    /// - Any error produced while decoding the variable's value.
    pub async fn variable(&self, label: &str) -> Result<DecodedVariable, DecodeError> {
        let variable = self
            .layout
            .variable(label)
            .ok_or_else(|| DecodeError::VariableNotFound(label.to_string()))?;
        debug!(variable = label, slot = %variable.slot, "Decoding storage variable");

        let descriptor = self.descriptor(&variable.typ)?;
        let value = self.decode(variable.slot, &variable.typ, 0).await?;

        Ok(DecodedVariable {
            typ: descriptor.label.clone(),
            value,
        })
    }

    /// Decodes every declared variable, returning `(label, result)` pairs in
    /// declaration order.
    ///
    /// The variables are decoded concurrently — they are independent at the
    /// top level — but a failure in any one of them fails the whole batch.
    pub async fn variables(&self) -> Result<Vec<(String, DecodedVariable)>, DecodeError> {
        let decodes = self.layout.variables().iter().map(|variable| async move {
            let decoded = self.variable(&variable.label).await?;
            Ok::<_, DecodeError>((variable.label.clone(), decoded))
        });

        try_join_all(decodes).await
    }

    /// Recursively decodes the value of type `reference` rooted at `slot`.
    ///
    /// The future is boxed because the function is self-referentially
    /// recursive through struct members and array elements.
    fn decode<'s>(
        &'s self,
        slot: Slot,
        reference: &'s str,
        depth: usize,
    ) -> BoxFuture<'s, Result<Value, DecodeError>> {
        async move {
            if depth > self.config.max_nesting_depth {
                return Err(DecodeError::NestingTooDeep {
                    max: self.config.max_nesting_depth,
                });
            }

            let descriptor = self.descriptor(reference)?;
            match &descriptor.variant {
                TypeVariant::Value => self.decode_leaf(slot, descriptor).await,

                // Mapping keys are not enumerable from layout + storage
                // alone, so the placeholder is independent of anything stored
                // at the mapping's slot and no read is issued for it.
                TypeVariant::Mapping { .. } => Ok(Value::Mapping),

                TypeVariant::DynamicArray { base } => {
                    self.decode_array(slot, base, depth).await
                }

                TypeVariant::Struct { members } => {
                    let fields = try_join_all(members.iter().map(|member| async move {
                        let member_slot = slot.offset_by(member.relative_slot);
                        let value = self.decode(member_slot, &member.typ, depth + 1).await?;
                        Ok::<_, DecodeError>((member.label.clone(), value))
                    }))
                    .await?;
                    Ok(Value::Struct(fields))
                }
            }
        }
        .boxed()
    }

    /// Decodes a scalar or blob leaf, dispatching on the type's label.
    async fn decode_leaf(
        &self,
        slot: Slot,
        descriptor: &TypeDescriptor,
    ) -> Result<Value, DecodeError> {
        match descriptor.label.as_str() {
            "bool" => {
                let word = self.read(slot).await?;
                Ok(Value::Bool(U256::from_be_bytes(word) != U256::ZERO))
            }
            "address" => {
                let word = self.read(slot).await?;
                let length = to_usize(descriptor.number_of_bytes)
                    .filter(|length| *length <= WORD_SIZE_BYTES)
                    .ok_or_else(|| {
                        DecodeError::LengthOutOfRange(descriptor.number_of_bytes.to_string())
                    })?;
                let bytes = &word[WORD_SIZE_BYTES - length..];
                Ok(Value::Address(checksum_address(bytes)))
            }
            "string" => {
                let bytes = self.decode_blob(slot).await?;
                Ok(Value::String(String::from_utf8(bytes)?))
            }
            "bytes" => Ok(Value::Bytes(self.decode_blob(slot).await?)),
            label if is_uint_label(label) => {
                // The full word value; masking to a narrower declared width
                // is the caller's concern.
                let word = self.read(slot).await?;
                Ok(Value::Uint(U256::from_be_bytes(word)))
            }
            label => Err(DecodeError::UnsupportedType(label.to_string())),
        }
    }

    /// Decodes a variable-length blob (the backing of `string` and `bytes`).
    ///
    /// The parity of the least-significant byte of the blob's own slot word
    /// selects the representation: even means the data is stored inline in
    /// the word itself with its doubled length in that byte; odd means the
    /// word holds `2 * length + 1` and the data fills consecutive words of
    /// the slot's overflow region.
    async fn decode_blob(&self, slot: Slot) -> Result<Vec<u8>, DecodeError> {
        let word = self.read(slot).await?;
        let low_byte = word[WORD_SIZE_BYTES - 1];

        if low_byte & 1 == 0 {
            let length = usize::from(low_byte / 2);
            if length > MAX_INLINE_BLOB_BYTES {
                return Err(DecodeError::LengthOutOfRange(length.to_string()));
            }
            trace!(%slot, length, "Decoding inline blob");
            return Ok(word[..length].to_vec());
        }

        let length = to_usize((U256::from_be_bytes(word) - U256::ONE) / U256::new(2)).ok_or_else(|| {
            DecodeError::LengthOutOfRange(U256::from_be_bytes(word).to_string())
        })?;
        let word_count = length.div_ceil(WORD_SIZE_BYTES);
        let base = slot.overflow_base();
        trace!(%slot, length, word_count, "Decoding out-of-line blob");

        let reads = (0..word_count)
            .map(|index| self.read(base.offset_by(U256::from(index as u128))));
        let chunks = try_join_all(reads).await?;

        let mut data = chunks.concat();
        data.truncate(length);
        Ok(data)
    }

    /// Decodes a dynamic array: the element count from the array's own slot,
    /// then each element from the slot's overflow region.
    async fn decode_array(
        &self,
        slot: Slot,
        base: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let word = self.read(slot).await?;
        let count = to_usize(U256::from_be_bytes(word)).ok_or_else(|| {
            DecodeError::LengthOutOfRange(U256::from_be_bytes(word).to_string())
        })?;

        let element = self.descriptor(base)?;
        // Array elements are never packed across slots: a type of 32 bytes
        // or fewer still occupies one full slot per element.
        let stride = (element.number_of_bytes / U256::new(WORD_SIZE_BYTES as u128))
            .max(U256::ONE);
        let data = slot.overflow_base();
        trace!(%slot, count, stride = %stride, "Decoding dynamic array");

        let elements = try_join_all((0..count).map(|index| {
            let element_slot = data.offset_by(stride.wrapping_mul(U256::from(index as u128)));
            self.decode(element_slot, base, depth + 1)
        }))
        .await?;

        Ok(Value::Array(elements))
    }

    /// Looks up a type descriptor, surfacing a dangling reference as an
    /// error rather than a panic.
    fn descriptor(&self, reference: &str) -> Result<&'a TypeDescriptor, DecodeError> {
        self.layout
            .type_descriptor(reference)
            .ok_or_else(|| DecodeError::UnknownTypeReference(reference.to_string()))
    }

    /// Reads the word at `slot` through the external capability.
    async fn read(&self, slot: Slot) -> Result<Word, DecodeError> {
        Ok(self.reader.read(slot.to_word()).await?)
    }
}

/// Checks whether `label` names an unsigned integer type (`uint` or `uintN`).
fn is_uint_label(label: &str) -> bool {
    label
        .strip_prefix("uint")
        .map_or(false, |suffix| {
            suffix.is_empty() || suffix.bytes().all(|byte| byte.is_ascii_digit())
        })
}
