//! This module contains error types for the decoder, split into a number of
//! enums by subsystem.
//!
//! All of the errors implement [`std::error::Error`], and hence can be used
//! with [`anyhow::Error`].

use thiserror::Error;

use crate::slot::Word;

/// Errors encountered while parsing or resolving a compiler-produced storage
/// layout into the crate's internal representation.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A type reference used by a declared variable, struct member, mapping
    /// or dynamic array has no entry in the layout's type dictionary.
    #[error("Type reference `{_0}` has no entry in the layout's type dictionary")]
    UnknownTypeReference(String),

    /// A `slot` field was not a valid decimal 256-bit integer.
    #[error("`{_0}` is not a valid decimal slot index")]
    InvalidSlotIndex(String),

    /// A `numberOfBytes` field was not a valid decimal 256-bit integer.
    #[error("`{_0}` is not a valid decimal byte count")]
    InvalidByteCount(String),

    /// The layout JSON did not match the compiler's wire format.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors encountered while decoding variable values out of contract storage.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The requested label does not name any declared variable in the layout.
    #[error("No variable named `{_0}` is declared in the storage layout")]
    VariableNotFound(String),

    /// A type reference had no entry in the layout's type dictionary.
    ///
    /// Layout resolution validates all references up front, so this cannot
    /// occur for a layout built through [`crate::layout::StorageLayout::resolve`];
    /// it is surfaced rather than panicked on to keep the decoder total.
    #[error("Type reference `{_0}` has no entry in the layout's type dictionary")]
    UnknownTypeReference(String),

    /// The type's label matches none of the supported scalar, blob, struct,
    /// mapping or dynamic array shapes.
    #[error("Storage type `{_0}` is not supported by the decoder")]
    UnsupportedType(String),

    /// A `string` variable's stored bytes were not valid UTF-8.
    #[error("String variable does not contain valid UTF-8")]
    InvalidString(#[from] std::string::FromUtf8Error),

    /// Structural decoding recursed deeper than the configured bound.
    #[error("Nesting depth exceeded the configured maximum of {max}")]
    NestingTooDeep {
        /// The configured maximum nesting depth.
        max: usize,
    },

    /// A stored length prefix describes more data than can be materialised
    /// in memory.
    #[error("Declared data length {_0} cannot be materialised")]
    LengthOutOfRange(String),

    /// The external slot-read capability failed.
    ///
    /// The failure is propagated unchanged; any retry policy belongs to the
    /// capability itself, not to the decoder.
    #[error(transparent)]
    StorageRead(#[from] StorageReadError),
}

/// An error produced by an implementation of the
/// [`crate::storage::StorageReader`] capability.
#[derive(Debug, Error)]
#[error("Storage read for slot 0x{} failed", hex::encode(.slot))]
pub struct StorageReadError {
    /// The slot word whose read failed.
    pub slot: Word,

    /// The underlying failure reported by the capability.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl StorageReadError {
    /// Constructs a new `StorageReadError` for `slot` from any underlying
    /// error.
    pub fn new(
        slot: Word,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            slot,
            source: source.into(),
        }
    }
}
