//! SQLite-backed medium.

use crate::{migrations, KeyValueStore, Mutation, StorageResult};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use tracing::{debug, error};

/// Key-value store over a single `kv_entries` table.
///
/// The connection sits behind a mutex, so every call (and every
/// read-modify-write in [`KeyValueStore::update`]) is serialized.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open a database at the given path, running migrations if needed.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        migrations::run_migrations(&conn)?;
        debug!(path = %path.display(), "Opened kv store");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn read_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_entries WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

fn write_value(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock();
        Ok(read_value(&conn, key)?)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock();
        write_value(&conn, key, value).map_err(|e| {
            error!(key, error = %e, "Failed to write kv entry");
            e
        })?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> StorageResult<Mutation>,
    ) -> StorageResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = read_value(&tx, key)?;
        match apply(current)? {
            Some(value) => write_value(&tx, key, &value)?,
            None => {
                tx.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
            }
        }

        tx.commit().map_err(|e| {
            error!(key, error = %e, "Failed to commit kv update");
            e
        })?;
        Ok(())
    }
}
