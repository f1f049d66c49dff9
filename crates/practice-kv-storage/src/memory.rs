//! In-memory medium.

use crate::{KeyValueStore, Mutation, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory storage with a switch that makes every call fail.
///
/// Used by unit and scenario tests to exercise `StorageError` paths.
#[derive(Default)]
pub struct MemoryKvStore {
    data: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent calls fail with [`StorageError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.data.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.ensure_available()?;
        Ok(self.data.lock().remove(key).is_some())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> StorageResult<Mutation>,
    ) -> StorageResult<()> {
        self.ensure_available()?;
        let mut data = self.data.lock();
        match apply(data.get(key).cloned())? {
            Some(value) => {
                data.insert(key.to_string(), value);
            }
            None => {
                data.remove(key);
            }
        }
        Ok(())
    }
}
