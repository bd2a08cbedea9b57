//! This module contains constants that are needed throughout the codebase.

/// The number of bytes in one EVM storage word.
pub const WORD_SIZE_BYTES: usize = 32;

/// The maximum number of bytes a string or byte array can occupy while still
/// being stored inline in its own slot.
///
/// Anything longer is stored out-of-line in the slot's overflow region, with
/// the slot itself holding only the encoded length.
pub const MAX_INLINE_BLOB_BYTES: usize = 31;

/// The default maximum nesting depth for structural decoding.
///
/// Storage layouts are externally supplied, so recursion over them has to be
/// bounded. Real contracts rarely nest types more than a handful of levels
/// deep; a layout that exceeds this bound fails the decode with
/// [`crate::error::DecodeError::NestingTooDeep`] rather than risking stack
/// exhaustion.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;
