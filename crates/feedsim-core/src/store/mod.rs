//! Store abstraction consumed by the similarity pass
//!
//! Users, feeds and entries are owned elsewhere; the engine only reads them.
//! Similarity edges are the one thing it writes back.

mod memory;

pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub title: String,
}

/// A content entry as stored; `content` may hold raw HTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub feed_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// A persisted similarity relation.
///
/// Stored in one direction (`entry_id` is the lower corpus position) but
/// semantically symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub entry_id: i64,
    pub similar_entry_id: i64,
    pub similarity: f64,
}

impl SimilarityEdge {
    pub fn new(entry_id: i64, similar_entry_id: i64, similarity: f64) -> Self {
        Self {
            entry_id,
            similar_entry_id,
            similarity,
        }
    }

    /// True if this edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: i64, b: i64) -> bool {
        (self.entry_id == a && self.similar_entry_id == b)
            || (self.entry_id == b && self.similar_entry_id == a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Read access to entries plus idempotent edge persistence
pub trait EntryStore {
    fn list_users(&self) -> Result<Vec<User>>;

    fn list_feeds(&self, user_id: i64) -> Result<Vec<Feed>>;

    /// Entries of a user, optionally restricted to one feed
    fn list_entries(&self, user_id: i64, feed_id: Option<i64>) -> Result<Vec<Entry>>;

    /// Every stored edge with `entry_id` at either end
    fn list_similar_edges(&self, entry_id: i64) -> Result<Vec<SimilarityEdge>>;

    /// Insert an edge unless the same ordered pair is already stored
    fn insert_similar_edge(&self, edge: &SimilarityEdge) -> Result<InsertOutcome>;

    /// Direction-agnostic lookup
    fn are_similar(&self, a: i64, b: i64) -> Result<bool> {
        Ok(self
            .list_similar_edges(a)?
            .iter()
            .any(|edge| edge.connects(a, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_connects_both_directions() {
        let edge = SimilarityEdge::new(1, 2, 0.5);
        assert!(edge.connects(1, 2));
        assert!(edge.connects(2, 1));
        assert!(!edge.connects(1, 3));
    }

    #[test]
    fn test_entry_deserialize_defaults() {
        let entry: Entry =
            serde_json::from_str(r#"{"id": 1, "user_id": 2, "feed_id": 3}"#).unwrap();
        assert_eq!(entry.title, "");
        assert_eq!(entry.content, "");
    }
}
