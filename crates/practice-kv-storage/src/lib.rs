//! Durable key-value medium for practice-sync.
//!
//! Every persisted logical record (result log, uploaded index, connection,
//! pending outbox) is a JSON text value under a well-known key. Two
//! implementations share the [`KeyValueStore`] trait:
//! - [`SqliteKvStore`]: the production medium, a single `kv_entries` table
//! - [`MemoryKvStore`]: in-process map with a failure switch, used by tests

mod error;
mod ext;
mod keys;
mod memory;
mod migrations;
mod sqlite;
mod traits;

pub use error::{StorageError, StorageResult};
pub use ext::JsonStoreExt;
pub use keys::StorageKeys;
pub use memory::MemoryKvStore;
pub use migrations::CURRENT_VERSION;
pub use sqlite::SqliteKvStore;
pub use traits::{KeyValueStore, Mutation};
