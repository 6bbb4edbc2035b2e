//! SQLite database module for feedsim

mod entries;
mod schema;
mod similar;

use crate::error::{FeedsimError, Result};
use crate::store::{Entry, EntryStore, Feed, InsertOutcome, SimilarityEdge, User};
use rusqlite::Connection;
use std::path::Path;

pub use entries::{ImportFile, ImportSummary};
pub use schema::{create_schema, SchemaState, CURRENT_SCHEMA_VERSION};
pub use similar::SimilarEntry;

/// SQLite database for feedsim
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(FeedsimError::DatabaseNotFound {
                path: db_path.to_path_buf(),
            });
        }
        Self::open_internal(db_path)
    }

    /// Open the database, creating the file and schema if needed
    pub fn create(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| FeedsimError::io_operation("create directory", parent.display(), e))?;
        }
        Self::open_internal(db_path)
    }

    /// In-memory database with the current schema
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| FeedsimError::db_operation("open in-memory database", e))?;
        Self::with_connection(conn)
    }

    fn open_internal(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(|e| {
            FeedsimError::Other(format!(
                "failed to open database at {}: {}",
                db_path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| FeedsimError::Other(format!("failed to enable WAL mode: {}", e)))?;

        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| crate::map_db_err!("enable foreign keys", e))?;

        let state = create_schema(&conn)
            .map_err(|e| FeedsimError::Other(format!("failed to create database schema: {}", e)))?;
        if let SchemaState::Mismatch { found } = state {
            return Err(FeedsimError::Other(format!(
                "database schema version {} is not supported (expected {})",
                found, CURRENT_SCHEMA_VERSION
            )));
        }

        Ok(Database { conn })
    }

    pub fn get_schema_version(&self) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'schema_version'",
                [],
                |r| {
                    let s: String = r.get(0)?;
                    Ok(s.parse().unwrap_or(0))
                },
            )
            .map_err(|e| FeedsimError::Other(format!("failed to get schema version: {}", e)))
    }

    pub fn get_entry_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
            .map_err(|e| FeedsimError::Other(format!("failed to get entry count: {}", e)))
    }

    pub fn get_edge_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM entry_similar", [], |r| r.get(0))
            .map_err(|e| FeedsimError::Other(format!("failed to get edge count: {}", e)))
    }
}

impl EntryStore for Database {
    fn list_users(&self) -> Result<Vec<User>> {
        Database::list_users(self)
    }

    fn list_feeds(&self, user_id: i64) -> Result<Vec<Feed>> {
        Database::list_feeds(self, user_id)
    }

    fn list_entries(&self, user_id: i64, feed_id: Option<i64>) -> Result<Vec<Entry>> {
        Database::list_entries(self, user_id, feed_id)
    }

    fn list_similar_edges(&self, entry_id: i64) -> Result<Vec<SimilarityEdge>> {
        Database::list_similar_edges(self, entry_id)
    }

    fn insert_similar_edge(&self, edge: &SimilarityEdge) -> Result<InsertOutcome> {
        Database::insert_similar_edge(self, edge)
    }

    fn are_similar(&self, a: i64, b: i64) -> Result<bool> {
        Database::are_similar(self, a, b)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Checkpoint so the next process sees every committed edge
        let _ = self.conn.pragma_update(None, "wal_checkpoint", "TRUNCATE");
    }
}

#[cfg(test)]
mod tests;
