//! SQLite database schema for feedsim

use rusqlite::{Connection, OptionalExtension, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Outcome of [`create_schema`]
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaState {
    /// Tables were created in an empty database
    Created,
    /// Schema already at the current version
    Current,
    /// Database was written by a different schema version
    Mismatch { found: i32 },
}

const SCHEMA_SQL: &str = r#"
-- Mirrors of the externally owned records
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feeds (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_feeds_user ON feeds(user_id);

CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    feed_id INTEGER NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    content TEXT
);
CREATE INDEX IF NOT EXISTS idx_entries_user_feed ON entries(user_id, feed_id);

-- Similarity edges, stored lower corpus position first
CREATE TABLE IF NOT EXISTS entry_similar (
    entry_id INTEGER NOT NULL,
    similar_entry_id INTEGER NOT NULL,
    similarity REAL NOT NULL CHECK (similarity >= 0.0 AND similarity <= 1.0),
    created_at TEXT NOT NULL,
    PRIMARY KEY (entry_id, similar_entry_id)
);
CREATE INDEX IF NOT EXISTS idx_entry_similar_target ON entry_similar(similar_entry_id);

-- Index metadata
CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT
);
"#;

pub fn read_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let has_meta: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'index_meta'",
        [],
        |r| r.get(0),
    )?;
    if !has_meta {
        return Ok(None);
    }

    conn.query_row(
        "SELECT value FROM index_meta WHERE key = 'schema_version'",
        [],
        |r| r.get::<_, String>(0).map(|s| s.parse().unwrap_or(0)),
    )
    .optional()
}

pub fn create_schema(conn: &Connection) -> Result<SchemaState> {
    match read_schema_version(conn)? {
        None => {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.execute(
                "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('schema_version', ?1)",
                [&CURRENT_SCHEMA_VERSION.to_string()],
            )?;
            tracing::debug!(version = CURRENT_SCHEMA_VERSION, "database schema created");
            Ok(SchemaState::Created)
        }
        Some(v) if v == CURRENT_SCHEMA_VERSION => Ok(SchemaState::Current),
        Some(found) => Ok(SchemaState::Mismatch { found }),
    }
}

#[cfg(test)]
pub fn force_set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('schema_version', ?1)",
        [&version.to_string()],
    )?;
    Ok(())
}
