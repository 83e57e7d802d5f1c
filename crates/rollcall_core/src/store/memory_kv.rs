//! In-process key-value backend.

use super::{KeyValueStore, StoreKey, StoreResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// Volatile store; contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<HashMap<StoreKey, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get_raw(&self, key: StoreKey) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(&key).cloned())
    }

    fn set_raw(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        self.entries.borrow_mut().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        self.entries.borrow_mut().remove(&key);
        Ok(())
    }
}
