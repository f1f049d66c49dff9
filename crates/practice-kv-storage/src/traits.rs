//! Storage trait definitions.

use crate::StorageResult;

/// Outcome of a read-modify-write step: the new value, or `None` to delete.
pub type Mutation = Option<String>;

/// Trait for key-value media holding JSON text values.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value, returning whether it existed
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Atomically read, transform and write back a single key.
    ///
    /// `apply` receives the current value and returns the value to store
    /// (`None` deletes the key). No other writer observes the key between the
    /// read and the write. An error from `apply` leaves the key untouched.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> StorageResult<Mutation>,
    ) -> StorageResult<()>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
