//! Session identity persistence.
//!
//! The logged-in identity lives under a single key and survives restarts
//! until an explicit logout.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Identity;

/// Key the session identity is stored under.
pub const SESSION_KEY: &str = "user";

impl Database {
    /// Store a JSON value under `key`, replacing any previous value.
    pub fn put_value(&self, key: &str, value: &serde_json::Value) -> DbResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            r#"
            INSERT INTO client_state (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, json],
        )?;
        Ok(())
    }

    /// Read the JSON value under `key`.
    pub fn get_value(&self, key: &str) -> DbResult<Option<serde_json::Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM client_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// Delete `key`. Returns whether anything was removed.
    pub fn delete_value(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM client_state WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }

    /// Persist the logged-in identity.
    pub fn save_identity(&self, identity: &Identity) -> DbResult<()> {
        self.put_value(SESSION_KEY, &serde_json::to_value(identity)?)
    }

    /// Load the persisted identity.
    ///
    /// A stored value that no longer decodes is treated as logged out.
    pub fn load_identity(&self) -> DbResult<Option<Identity>> {
        let Some(value) = self.get_value(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session identity");
                Ok(None)
            }
        }
    }

    /// Forget the persisted identity.
    pub fn clear_identity(&self) -> DbResult<bool> {
        self.delete_value(SESSION_KEY)
    }
}
