//! SQLite schema definition.

/// Stored in `PRAGMA user_version`. Bump when `SCHEMA` changes shape.
pub const SCHEMA_VERSION: i64 = 1;

/// Complete database schema for the client.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Client State (key/value, JSON values)
-- ============================================================================

CREATE TABLE IF NOT EXISTS client_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
