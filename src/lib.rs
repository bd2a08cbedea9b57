//! This library reconstructs typed, human-meaningful variable values from the
//! raw 32-byte words of a deployed contract's
//! [storage](https://docs.soliditylang.org/en/latest/internals/layout_in_storage.html),
//! driven by the storage-layout description the Solidity compiler emits
//! alongside the bytecode.
//!
//! Storage I/O itself is delegated: the decoder consumes a read-only
//! slot-read capability and never assumes where the words come from. What it
//! implements is the reversal of the compiler's packing-aware encoding —
//! scalars, strings, byte blobs, structs, dynamic arrays and mappings spread
//! across 256-bit slots, including the cryptographically-addressed overflow
//! regions used for variable-length data.
//!
//! # How it Works
//!
//! From a very high level, decoding proceeds as follows:
//!
//! 1. The compiler's `storageLayout` JSON is parsed into the wire-format
//!    [`layout::StorageLayout`] and resolved into a [`layout::Layout`]. At
//!    this point every type entry is classified once into the
//!    [`layout::TypeVariant`] sum type and every type reference is validated
//!    against the dictionary.
//! 2. A [`decoder::Decoder`] is constructed over the resolved layout and a
//!    [`storage::StorageReader`] capability.
//! 3. A query walks the type structure recursively: leaves decode a fetched
//!    word by the type's label ([`value::Value`] scalars, or the short/long
//!    split for strings and byte blobs), structs fan out into their members,
//!    dynamic arrays read their element count and fan out into their
//!    elements, and mappings yield the documented empty placeholder.
//! 4. Reads that do not depend on each other — struct members, array
//!    elements, distinct top-level variables — are issued concurrently and
//!    joined; results recombine bottom-up into the decoded value tree.
//!
//! # Basic Usage
//!
//! ```
//! use storage_layout_decoder::{
//!     slot::Slot,
//!     storage::InMemoryStorage,
//!     Decoder,
//!     Layout,
//!     Value,
//! };
//!
//! let layout = Layout::from_json(
//!     r#"{
//!         "storage": [
//!             { "label": "counter", "offset": 0, "slot": "0", "type": "t_uint256" }
//!         ],
//!         "types": {
//!             "t_uint256": {
//!                 "encoding": "inplace",
//!                 "label": "uint256",
//!                 "numberOfBytes": "32"
//!             }
//!         }
//!     }"#,
//! )
//! .unwrap();
//!
//! let mut storage = InMemoryStorage::new();
//! let mut word = [0u8; 32];
//! word[31] = 42;
//! storage.set(Slot::from(0usize).to_word(), word);
//!
//! let decoder = Decoder::new(&layout, &storage);
//! let counter = futures::executor::block_on(decoder.variable("counter")).unwrap();
//!
//! assert_eq!(counter.typ, "uint256");
//! assert_eq!(counter.value, Value::Uint(ethnum::U256::new(42)));
//! ```
//!
//! # Limitations
//!
//! Mapping variables decode to an empty placeholder: storage alone cannot
//! enumerate a mapping's keys, and integrating an external key log is out of
//! scope for this crate. Narrow scalars packed into a shared slot decode the
//! whole fetched word; masking to the declared width is the caller's
//! concern.

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod constant;
pub mod decoder;
pub mod error;
pub mod layout;
pub mod slot;
pub mod storage;
pub mod utility;
pub mod value;

pub use decoder::{Config, Decoder};
pub use layout::{Layout, StorageLayout};
pub use value::{DecodedVariable, Value};
