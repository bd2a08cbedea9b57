//! This module implements the slot arithmetic used by the decoder:
//! conversions between a 256-bit slot index and its 32-byte big-endian word
//! form, slot increments, and the cryptographic derivation of a slot's
//! overflow region.

use std::fmt::{Debug, Display, Formatter};

use ethnum::U256;
use sha3::{Digest, Keccak256};

use crate::{constant::WORD_SIZE_BYTES, error::LayoutError};

/// The 32-byte big-endian value stored at one storage slot.
pub type Word = [u8; WORD_SIZE_BYTES];

/// The word returned for any slot that has never been written.
pub const ZERO_WORD: Word = [0; WORD_SIZE_BYTES];

/// The index of one 256-bit unit of contract-persistent storage.
///
/// Using [`U256`] as the representation makes the requirement that slot
/// indices fit in 256 bits structural; indices above 64 bits occur in
/// practice (EIP-1967 proxy slots, overflow regions), so no fixed-width
/// machine integer is ever used for slot arithmetic.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Slot(pub U256);

impl Slot {
    /// Encodes the slot index as a 32-byte big-endian word, zero-padded on
    /// the left.
    #[must_use]
    pub fn to_word(self) -> Word {
        self.0.to_be_bytes()
    }

    /// Reconstructs the slot index from its 32-byte big-endian word form.
    #[must_use]
    pub fn from_word(word: Word) -> Self {
        Self(U256::from_be_bytes(word))
    }

    /// Parses a slot index from the decimal string representation used by the
    /// compiler's storage-layout output.
    pub fn from_decimal(text: &str) -> Result<Self, LayoutError> {
        U256::from_str_radix(text, 10)
            .map(Self)
            .map_err(|_| LayoutError::InvalidSlotIndex(text.to_string()))
    }

    /// Derives the base slot of this slot's overflow region by hashing the
    /// slot's word form with Keccak-256.
    ///
    /// Variable-length data that does not fit inline lives in consecutive
    /// slots starting here; the k-th overflow slot is `overflow_base() + k`.
    #[must_use]
    pub fn overflow_base(self) -> Self {
        let digest = Keccak256::digest(self.to_word());
        Self(U256::from_be_bytes(digest.into()))
    }

    /// Returns the slot `by` slots after this one.
    ///
    /// The addition wraps in 256 bits, matching the EVM's own slot
    /// arithmetic; an overflow region near the top of the address space wraps
    /// around rather than aborting.
    #[must_use]
    pub fn offset_by(self, by: U256) -> Self {
        Self(self.0.wrapping_add(by))
    }
}

/// Interprets a big-endian byte sequence of at most 32 bytes as a 256-bit
/// unsigned integer, returning [`None`] for longer inputs.
///
/// An empty or all-zero input yields zero.
#[must_use]
pub fn uint_from_be(bytes: &[u8]) -> Option<U256> {
    if bytes.len() > WORD_SIZE_BYTES {
        return None;
    }
    let mut word = ZERO_WORD;
    word[WORD_SIZE_BYTES - bytes.len()..].copy_from_slice(bytes);
    Some(U256::from_be_bytes(word))
}

impl Debug for Slot {
    /// The newtype has no semantic meaning of its own, so the debug
    /// representation is the underlying index.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for Slot {
    /// Displays the slot in the `0x`-prefixed word form it is read by.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_word()))
    }
}

impl From<U256> for Slot {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<Slot> for U256 {
    fn from(Slot(value): Slot) -> Self {
        value
    }
}

impl From<usize> for Slot {
    fn from(value: usize) -> Self {
        Self(U256::from(value as u128))
    }
}
