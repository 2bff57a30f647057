use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::foundation::error::{SilkflowError, SilkflowResult};

/// Session-scoped string storage.
///
/// Both calls may fail (storage disabled, quota denied); callers decide how to tolerate it.
pub trait SessionStorage {
    /// Value under `key`, `None` when absent.
    fn get(&self, key: &str) -> SilkflowResult<Option<String>>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> SilkflowResult<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Box<T> {
    fn get(&self, key: &str) -> SilkflowResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> SilkflowResult<()> {
        (**self).set(key, value)
    }
}

/// In-memory storage. Clones share one map, so every mount in a session sees the same record.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every key (a new session).
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> SilkflowResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SilkflowResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage that refuses every access, as when session storage is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledStorage;

impl SessionStorage for DisabledStorage {
    fn get(&self, _key: &str) -> SilkflowResult<Option<String>> {
        Err(SilkflowError::storage("session storage is disabled"))
    }

    fn set(&mut self, _key: &str, _value: &str) -> SilkflowResult<()> {
        Err(SilkflowError::storage("session storage is disabled"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/storage.rs"]
mod tests;
