//! Typed JSON helpers layered over any [`KeyValueStore`].

use crate::{KeyValueStore, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON (de)serialization on top of the raw string medium.
///
/// Missing keys decode as `T::default()`, so an empty log, an empty uploaded
/// index and an empty outbox need no special casing by callers.
pub trait JsonStoreExt {
    /// Load and decode a value, or `T::default()` when the key is absent.
    fn load_json<T>(&self, key: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Default;

    /// Encode and store a value.
    fn store_json<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized;

    /// Decode, mutate in place, and re-encode a value in one atomic step.
    fn update_json<T, R, F>(&self, key: &str, mutate: F) -> StorageResult<R>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> R;
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {
    fn load_json<T>(&self, key: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(T::default()),
        }
    }

    fn store_json<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }

    fn update_json<T, R, F>(&self, key: &str, mutate: F) -> StorageResult<R>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> R,
    {
        let mut mutate = Some(mutate);
        let mut output = None;

        self.update(key, &mut |current| {
            let mut value: T = match current {
                Some(raw) => serde_json::from_str(&raw)?,
                None => T::default(),
            };
            if let Some(mutate) = mutate.take() {
                output = Some(mutate(&mut value));
            }
            Ok(Some(serde_json::to_string(&value)?))
        })?;

        // `update` invokes the closure exactly once on success.
        output.ok_or_else(|| {
            crate::StorageError::Unavailable(format!("update of {key} did not run"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryKvStore, StorageError};
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn load_json_defaults_when_missing() {
        let store = MemoryKvStore::new();
        let counter: Counter = store.load_json("counter").unwrap();
        assert_eq!(counter, Counter::default());

        let list: Vec<String> = store.load_json("list").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn store_then_load_json() {
        let store = MemoryKvStore::new();
        store.store_json("counter", &Counter { hits: 4 }).unwrap();

        let counter: Counter = store.load_json("counter").unwrap();
        assert_eq!(counter.hits, 4);
    }

    #[test]
    fn update_json_returns_closure_output() {
        let store = MemoryKvStore::new();
        let after = store
            .update_json("counter", |c: &mut Counter| {
                c.hits += 2;
                c.hits
            })
            .unwrap();
        assert_eq!(after, 2);

        let after = store
            .update_json("counter", |c: &mut Counter| {
                c.hits += 1;
                c.hits
            })
            .unwrap();
        assert_eq!(after, 3);
    }

    #[test]
    fn corrupt_value_surfaces_json_error() {
        let store = MemoryKvStore::new();
        store.set("counter", "{not json").unwrap();

        let err = store.load_json::<Counter>("counter").unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));

        let err = store
            .update_json("counter", |c: &mut Counter| c.hits += 1)
            .unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
        assert_eq!(store.get("counter").unwrap().as_deref(), Some("{not json"));
    }
}
