use chrono::Utc;
use rusqlite::params;
use serde::Serialize;

use crate::error::{FeedsimError, Result};
use crate::store::{InsertOutcome, SimilarityEdge};

/// A stored neighbour of an entry, as shown by `feedsim similar`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarEntry {
    pub entry_id: i64,
    pub title: String,
    pub url: String,
    pub similarity: f64,
    pub created_at: String,
}

impl super::Database {
    /// Insert-if-absent on the `(entry_id, similar_entry_id)` key
    pub fn insert_similar_edge(&self, edge: &SimilarityEdge) -> Result<InsertOutcome> {
        if !(0.0..=1.0).contains(&edge.similarity) {
            crate::bail_invalid!("similarity", edge.similarity);
        }

        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO entry_similar (entry_id, similar_entry_id, similarity, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    edge.entry_id,
                    edge.similar_entry_id,
                    edge.similarity,
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| crate::map_db_err!("insert similar edge", e))?;

        Ok(if changed == 0 {
            InsertOutcome::AlreadyExists
        } else {
            InsertOutcome::Inserted
        })
    }

    /// Edges with `entry_id` at either end
    pub fn list_similar_edges(&self, entry_id: i64) -> Result<Vec<SimilarityEdge>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT entry_id, similar_entry_id, similarity FROM entry_similar
                 WHERE entry_id = ?1 OR similar_entry_id = ?1
                 ORDER BY entry_id, similar_entry_id",
            )
            .map_err(|e| crate::map_db_err!("prepare similar edges query", e))?;

        let edges = stmt
            .query_map(params![entry_id], |row| {
                Ok(SimilarityEdge {
                    entry_id: row.get(0)?,
                    similar_entry_id: row.get(1)?,
                    similarity: row.get(2)?,
                })
            })
            .map_err(|e| crate::map_db_err!("execute similar edges query", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("read similar edge", e))?;
        Ok(edges)
    }

    /// True if an edge joins `a` and `b` in either direction
    pub fn are_similar(&self, a: i64, b: i64) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM entry_similar
                 WHERE (entry_id = ?1 AND similar_entry_id = ?2)
                    OR (entry_id = ?2 AND similar_entry_id = ?1)",
                params![a, b],
                |r| r.get(0),
            )
            .map_err(|e| crate::map_db_err!("query similar pair", e))?;
        Ok(count > 0)
    }

    /// Neighbours of an entry with their titles, most similar first
    pub fn similar_entries(&self, entry_id: i64) -> Result<Vec<SimilarEntry>> {
        if self.get_entry(entry_id)?.is_none() {
            return Err(FeedsimError::EntryNotFound { id: entry_id });
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT e.id, e.title, e.url, s.similarity, s.created_at
                 FROM entry_similar s
                 JOIN entries e ON e.id = CASE
                     WHEN s.entry_id = ?1 THEN s.similar_entry_id
                     ELSE s.entry_id
                 END
                 WHERE s.entry_id = ?1 OR s.similar_entry_id = ?1
                 ORDER BY s.similarity DESC, e.id",
            )
            .map_err(|e| crate::map_db_err!("prepare similar entries query", e))?;

        let entries = stmt
            .query_map(params![entry_id], |row| {
                Ok(SimilarEntry {
                    entry_id: row.get(0)?,
                    title: row.get(1)?,
                    url: row.get(2)?,
                    similarity: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| crate::map_db_err!("execute similar entries query", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("read similar entry", e))?;
        Ok(entries)
    }
}
