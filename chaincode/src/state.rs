//! World-state abstraction the contract reads and writes.

use std::collections::BTreeMap;

use crate::ContractError;

/// Key-value snapshot a contract executes against.
///
/// A peer backs this with its state database; tests use [`MemoryState`].
pub trait WorldState {
    /// Current value under `key`, or `None` when absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, ContractError>;
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), ContractError>;
    /// Remove `key`. Removing an absent key is not an error.
    fn del_state(&mut self, key: &str) -> Result<(), ContractError>;
}

/// Ordered in-memory world state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryState {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl WorldState for MemoryState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, ContractError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), ContractError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), ContractError> {
        self.entries.remove(key);
        Ok(())
    }
}
