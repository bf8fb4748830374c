//! SQLite-backed key-value store.
//!
//! Holds the persisted task list and the user's interval settings in a single
//! `kv` table inside `pomotask.db`.

use std::path::Path;

use rusqlite::{params, Connection};

use super::{data_dir, KeyValueStore};
use crate::error::{Result, StorageError};

/// SQLite database exposing the [`KeyValueStore`] contract.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `<data_dir>/pomotask.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomotask.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip_in_memory() {
        let mut db = SqliteStore::open_memory().unwrap();
        assert!(db.get("tasks").unwrap().is_none());
        db.set("tasks", "[]").unwrap();
        assert_eq!(db.get("tasks").unwrap().as_deref(), Some("[]"));
        db.set("tasks", "[1]").unwrap();
        assert_eq!(db.get("tasks").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomotask.db");
        {
            let mut db = SqliteStore::open_at(&path).unwrap();
            db.set("shortBreakLength", "4").unwrap();
        }
        let db = SqliteStore::open_at(&path).unwrap();
        assert_eq!(db.get("shortBreakLength").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn open_at_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/pomotask.db");
        let err = SqliteStore::open_at(&path).err().unwrap();
        assert!(err.to_string().contains("Failed to open database"));
    }
}
