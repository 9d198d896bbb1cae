use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;

/// Opaque key-value store holding serialized blobs.
///
/// The catalog keeps its whole profile collection under a single key.
pub trait BlobStore {
    /// Read a blob; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write (or replace) a blob
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// SQLite-backed blob store.
///
/// The database file is created in the user's data directory:
/// - Linux: ~/.local/share/xmu-cats/catalog.db
/// - macOS: ~/Library/Application Support/xmu-cats/catalog.db
/// - Windows: %APPDATA%\xmu-cats\catalog.db
pub struct SqliteBlobStore {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteBlobStore {
    /// Open or create the store at `db_path`
    pub fn open(db_path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::info!(path = %db_path.display(), "Blob store opened");

        let store = SqliteBlobStore {
            conn,
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Store that lives only as long as the connection; used when no data directory exists
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let store = SqliteBlobStore {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Default location of the database file, `None` if no data directory exists
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("xmu-cats");
        path.push("catalog.db");
        Some(path)
    }

    fn init_schema(&self) -> Result<(), PersistenceError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBlobStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Plain map store with no durability
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_none() {
        let store = SqliteBlobStore::open_in_memory().unwrap();
        assert_eq!(store.get("xmu_cats").unwrap(), None);
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let mut store = SqliteBlobStore::open_in_memory().unwrap();
        store.set("xmu_cats", "[]").unwrap();
        store.set("xmu_cats", "[1]").unwrap();
        assert_eq!(store.get("xmu_cats").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        {
            let mut store = SqliteBlobStore::open(&path).unwrap();
            store.set("xmu_cats", "[\"大白\"]").unwrap();
        }

        let store = SqliteBlobStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.get("xmu_cats").unwrap().as_deref(), Some("[\"大白\"]"));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryBlobStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
