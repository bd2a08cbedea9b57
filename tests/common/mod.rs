//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.
//!
//! The fixture is the storage layout and populated storage of the following
//! contract, compiled with `storageLayout` output enabled:
//!
//! ```solidity
//! contract A {
//!   struct S { uint256 a; uint256 c; string nestedString; }
//!
//!   uint x = 1;
//!   uint y = 2;
//!   bool b = true;
//!   S s;
//!   address addr = 0x5BF4be9de72713bFE39A30EbE0691afd5fb7413a;
//!   mapping (address => bool) map1;
//!   string s1;
//!   bytes b1;
//!   S[] sArray;
//!   uint256[] array;
//!
//!   constructor() {
//!     s = S(7, 3, "hello");
//!     array.push(1); array.push(2); array.push(3);
//!     sArray.push(S(5, 4, "yo")); sArray.push(S(8, 9, "oy"));
//!   }
//! }
//! ```

#![cfg(test)]
#![allow(unused)] // Not every suite uses every helper

use ethnum::U256;
use storage_layout_decoder::{
    slot::{Slot, ZERO_WORD},
    storage::InMemoryStorage,
    Layout,
};

/// The address value held by the fixture's `addr` variable, in its
/// checksum-cased form.
pub const ADDR_CHECKSUMMED: &str = "0x5BF4be9de72713bFE39A30EbE0691afd5fb7413a";

/// The `storageLayout` JSON of the fixture contract.
pub const STORAGE_SOL_LAYOUT: &str = r#"{
    "storage": [
        { "astId": 15, "contract": "Storage.sol:A", "label": "x", "offset": 0, "slot": "0", "type": "t_uint256" },
        { "astId": 17, "contract": "Storage.sol:A", "label": "y", "offset": 0, "slot": "1", "type": "t_uint256" },
        { "astId": 19, "contract": "Storage.sol:A", "label": "b", "offset": 0, "slot": "2", "type": "t_bool" },
        { "astId": 21, "contract": "Storage.sol:A", "label": "s", "offset": 0, "slot": "3", "type": "t_struct(S)13_storage" },
        { "astId": 23, "contract": "Storage.sol:A", "label": "addr", "offset": 0, "slot": "6", "type": "t_address" },
        { "astId": 27, "contract": "Storage.sol:A", "label": "map1", "offset": 0, "slot": "7", "type": "t_mapping(t_address,t_bool)" },
        { "astId": 29, "contract": "Storage.sol:A", "label": "s1", "offset": 0, "slot": "8", "type": "t_string_storage" },
        { "astId": 31, "contract": "Storage.sol:A", "label": "b1", "offset": 0, "slot": "9", "type": "t_bytes_storage" },
        { "astId": 34, "contract": "Storage.sol:A", "label": "sArray", "offset": 0, "slot": "10", "type": "t_array(t_struct(S)13_storage)dyn_storage" },
        { "astId": 37, "contract": "Storage.sol:A", "label": "array", "offset": 0, "slot": "11", "type": "t_array(t_uint256)dyn_storage" }
    ],
    "types": {
        "t_address": { "encoding": "inplace", "label": "address", "numberOfBytes": "20" },
        "t_array(t_struct(S)13_storage)dyn_storage": {
            "encoding": "dynamic_array",
            "label": "struct A.S[]",
            "numberOfBytes": "32",
            "base": "t_struct(S)13_storage"
        },
        "t_array(t_uint256)dyn_storage": {
            "encoding": "dynamic_array",
            "label": "uint256[]",
            "numberOfBytes": "32",
            "base": "t_uint256"
        },
        "t_bool": { "encoding": "inplace", "label": "bool", "numberOfBytes": "1" },
        "t_bytes_storage": { "encoding": "bytes", "label": "bytes", "numberOfBytes": "32" },
        "t_mapping(t_address,t_bool)": {
            "encoding": "mapping",
            "label": "mapping(address => bool)",
            "numberOfBytes": "32",
            "key": "t_address",
            "value": "t_bool"
        },
        "t_string_storage": { "encoding": "bytes", "label": "string", "numberOfBytes": "32" },
        "t_struct(S)13_storage": {
            "encoding": "inplace",
            "label": "struct A.S",
            "numberOfBytes": "96",
            "members": [
                { "astId": 6, "contract": "Storage.sol:A", "label": "a", "offset": 0, "slot": "0", "type": "t_uint256" },
                { "astId": 8, "contract": "Storage.sol:A", "label": "c", "offset": 0, "slot": "1", "type": "t_uint256" },
                { "astId": 10, "contract": "Storage.sol:A", "label": "nestedString", "offset": 0, "slot": "2", "type": "t_string_storage" }
            ]
        },
        "t_uint256": { "encoding": "inplace", "label": "uint256", "numberOfBytes": "32" }
    }
}"#;

/// Resolves the fixture contract's layout.
pub fn storage_sol_layout() -> anyhow::Result<Layout> {
    Ok(Layout::from_json(STORAGE_SOL_LAYOUT)?)
}

/// Writes `value` into `slot` as a right-aligned integer word.
pub fn set_uint(storage: &mut InMemoryStorage, slot: Slot, value: u128) {
    storage.set(slot.to_word(), Slot(U256::from(value)).to_word());
}

/// Writes `bytes` into the low-order end of the word at `slot`, the way the
/// compiler stores addresses and other narrow value types at offset zero.
pub fn set_right_aligned(storage: &mut InMemoryStorage, slot: Slot, bytes: &[u8]) {
    let mut word = ZERO_WORD;
    word[32 - bytes.len()..].copy_from_slice(bytes);
    storage.set(slot.to_word(), word);
}

/// Writes `data` into the blob rooted at `slot` using the compiler's
/// short/long encoding: up to 31 bytes inline with the doubled length in the
/// low byte, longer payloads as `2 * length + 1` in the slot itself with the
/// data in consecutive overflow slots.
pub fn set_blob(storage: &mut InMemoryStorage, slot: Slot, data: &[u8]) {
    if data.len() <= 31 {
        let mut word = ZERO_WORD;
        word[..data.len()].copy_from_slice(data);
        word[31] = (data.len() * 2) as u8;
        storage.set(slot.to_word(), word);
        return;
    }

    let encoded_length = U256::from(data.len() as u128) * U256::new(2) + U256::ONE;
    storage.set(slot.to_word(), Slot(encoded_length).to_word());

    let base = slot.overflow_base();
    for (index, chunk) in data.chunks(32).enumerate() {
        let mut word = ZERO_WORD;
        word[..chunk.len()].copy_from_slice(chunk);
        storage.set(base.offset_by(U256::from(index as u128)).to_word(), word);
    }
}

/// Writes the fixture struct `S(a, c, nested)` rooted at `slot`.
pub fn set_struct_s(storage: &mut InMemoryStorage, slot: Slot, a: u128, c: u128, nested: &str) {
    set_uint(storage, slot, a);
    set_uint(storage, slot.offset_by(U256::ONE), c);
    set_blob(storage, slot.offset_by(U256::new(2)), nested.as_bytes());
}

/// Builds the post-constructor storage of the fixture contract.
pub fn populated_storage() -> InMemoryStorage {
    let mut storage = InMemoryStorage::new();

    set_uint(&mut storage, Slot::from(0usize), 1);
    set_uint(&mut storage, Slot::from(1usize), 2);
    set_uint(&mut storage, Slot::from(2usize), 1); // b = true
    set_struct_s(&mut storage, Slot::from(3usize), 7, 3, "hello");

    let addr = hex::decode("5bf4be9de72713bfe39a30ebe0691afd5fb7413a").unwrap();
    set_right_aligned(&mut storage, Slot::from(6usize), &addr);

    // map1 has been written to on-chain; whatever its own slot happens to
    // hold, the decoder must not interpret it.
    set_uint(&mut storage, Slot::from(7usize), 0xdead_beef);

    // array = [1, 2, 3]
    let array_slot = Slot::from(11usize);
    set_uint(&mut storage, array_slot, 3);
    let data = array_slot.overflow_base();
    for (index, element) in [1u128, 2, 3].into_iter().enumerate() {
        set_uint(&mut storage, data.offset_by(U256::from(index as u128)), element);
    }

    // sArray = [S(5, 4, "yo"), S(8, 9, "oy")], stride of three slots
    let s_array_slot = Slot::from(10usize);
    set_uint(&mut storage, s_array_slot, 2);
    let data = s_array_slot.overflow_base();
    set_struct_s(&mut storage, data, 5, 4, "yo");
    set_struct_s(&mut storage, data.offset_by(U256::new(3)), 8, 9, "oy");

    storage
}
