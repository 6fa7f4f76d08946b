//! Local client state, persisted in SQLite.
//!
//! The backend owns every record; the only thing kept on the device is the
//! session identity, stored as JSON under a fixed key.

mod schema;
mod session;

pub use schema::*;
pub use session::*;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

/// Session store errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot create store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store was written by a newer client (schema version {found}, expected {expected})")]
    UnsupportedVersion { found: i64, expected: i64 },
}

pub type DbResult<T> = Result<T, DbError>;

/// Key/value store for client state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the store at `path`, creating the file and its directory on
    /// first use.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)?,
            _ => {}
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Throwaway store, gone when dropped.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        let found: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if found > SCHEMA_VERSION {
            return Err(DbError::UnsupportedVersion {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    /// Schema version recorded in the file.
    pub fn schema_version(&self) -> DbResult<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_store_is_versioned() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(db.get_value("anything").unwrap(), None);
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");
        Database::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_newer_store_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
                .unwrap();
        }
        assert!(matches!(
            Database::open(&path),
            Err(DbError::UnsupportedVersion { .. })
        ));
    }
}
