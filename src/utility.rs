//! Utility functions useful throughout the codebase.

use ethnum::U256;
use sha3::{Digest, Keccak256};

/// Renders the provided address bytes as a `0x`-prefixed, checksum-cased hex
/// string as specified by [EIP-55](https://eips.ethereum.org/EIPS/eip-55).
///
/// A hex digit is uppercased exactly when the corresponding nibble of the
/// Keccak-256 digest of the lowercase hex rendering is at least eight, making
/// the casing deterministic for any given byte sequence.
#[must_use]
pub fn checksum_address(bytes: &[u8]) -> String {
    let lowercase = hex::encode(bytes);
    let digest = Keccak256::digest(lowercase.as_bytes());

    let mut rendered = String::with_capacity(2 + lowercase.len());
    rendered.push_str("0x");
    for (position, digit) in lowercase.chars().enumerate() {
        let nibble = if position % 2 == 0 {
            digest[position / 2] >> 4
        } else {
            digest[position / 2] & 0x0f
        };
        if nibble >= 8 {
            rendered.push(digit.to_ascii_uppercase());
        } else {
            rendered.push(digit);
        }
    }

    rendered
}

/// Converts a 256-bit value to a [`usize`], returning [`None`] when it does
/// not fit.
///
/// Stored length prefixes are attacker-controllable in principle, so they are
/// never cast with truncation.
#[must_use]
pub fn to_usize(value: U256) -> Option<usize> {
    let (high, low) = value.into_words();
    if high != 0 {
        return None;
    }
    usize::try_from(low).ok()
}
