//! This module contains the capability through which the decoder reads
//! contract storage.
//!
//! The decoder never talks to an execution engine directly; it is handed a
//! [`StorageReader`] explicitly (never ambient state), which keeps it
//! testable against an in-memory fake and agnostic to where the words really
//! come from — a local VM, a remote node, or a recorded snapshot. The
//! capability is read-only by construction: nothing in this crate can request
//! a write through it.

use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::StorageReadError,
    slot::{Word, ZERO_WORD},
};

/// A dynamically dispatched [`StorageReader`] instance.
pub type DynStorageReader = Arc<dyn StorageReader + Send + Sync>;

/// The interface to an object that can produce the 32-byte word stored at a
/// given slot.
///
/// Implementations must return the zero word for any slot that has never
/// been written. Within one decode call the decoder assumes the underlying
/// state is a stable snapshot; implementations backed by mutable state
/// should pin a snapshot before serving reads.
#[async_trait]
pub trait StorageReader
where
    Self: Debug,
{
    /// Reads the word stored at the slot addressed by `slot`.
    async fn read(&self, slot: Word) -> Result<Word, StorageReadError>;
}

/// An in-memory [`StorageReader`] backed by a hash map.
///
/// This is the fake the crate's own tests decode against, and is useful to
/// any client that captures a storage snapshot up front.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    slots: HashMap<Word, Word>,
}

impl InMemoryStorage {
    /// Constructs a new, empty storage snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the word stored at the slot addressed by `slot`.
    pub fn set(&mut self, slot: Word, value: Word) {
        self.slots.insert(slot, value);
    }

    /// Wraps the snapshot into a [`DynStorageReader`].
    #[must_use]
    pub fn in_arc(self) -> DynStorageReader {
        Arc::new(self)
    }
}

#[async_trait]
impl StorageReader for InMemoryStorage {
    async fn read(&self, slot: Word) -> Result<Word, StorageReadError> {
        Ok(self.slots.get(&slot).copied().unwrap_or(ZERO_WORD))
    }
}
