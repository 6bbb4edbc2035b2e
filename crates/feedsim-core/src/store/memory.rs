//! In-memory [`EntryStore`] used by tests and dry runs

use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Entry, EntryStore, Feed, InsertOutcome, SimilarityEdge, User};
use crate::error::{FeedsimError, Result};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    feeds: Vec<Feed>,
    entries: Vec<Entry>,
    edges: BTreeMap<(i64, i64), f64>,
    failing_users: HashSet<i64>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| FeedsimError::Other(format!("memory store lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| FeedsimError::Other(format!("memory store lock poisoned: {}", e)))
    }

    pub fn add_user(&self, id: i64, username: &str) -> Result<()> {
        self.write()?.users.push(User {
            id,
            username: username.to_string(),
        });
        Ok(())
    }

    pub fn add_feed(&self, feed: Feed) -> Result<()> {
        self.write()?.feeds.push(feed);
        Ok(())
    }

    pub fn add_entry(&self, entry: Entry) -> Result<()> {
        self.write()?.entries.push(entry);
        Ok(())
    }

    /// Make every edge insert for this user's entries fail
    pub fn fail_inserts_for(&self, user_id: i64) -> Result<()> {
        self.write()?.failing_users.insert(user_id);
        Ok(())
    }

    /// All stored edges in `(entry_id, similar_entry_id)` order
    pub fn edges(&self) -> Result<Vec<SimilarityEdge>> {
        Ok(self
            .read()?
            .edges
            .iter()
            .map(|(&(a, b), &score)| SimilarityEdge::new(a, b, score))
            .collect())
    }
}

impl EntryStore for MemoryStore {
    fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.read()?.users.clone();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    fn list_feeds(&self, user_id: i64) -> Result<Vec<Feed>> {
        let mut feeds: Vec<Feed> = self
            .read()?
            .feeds
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        feeds.sort_by_key(|f| f.id);
        Ok(feeds)
    }

    fn list_entries(&self, user_id: i64, feed_id: Option<i64>) -> Result<Vec<Entry>> {
        Ok(self
            .read()?
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && feed_id.is_none_or(|f| e.feed_id == f))
            .cloned()
            .collect())
    }

    fn list_similar_edges(&self, entry_id: i64) -> Result<Vec<SimilarityEdge>> {
        Ok(self
            .read()?
            .edges
            .iter()
            .filter(|((a, b), _)| *a == entry_id || *b == entry_id)
            .map(|(&(a, b), &score)| SimilarityEdge::new(a, b, score))
            .collect())
    }

    fn insert_similar_edge(&self, edge: &SimilarityEdge) -> Result<InsertOutcome> {
        let mut inner = self.write()?;
        let owner = inner
            .entries
            .iter()
            .find(|e| e.id == edge.entry_id)
            .map(|e| e.user_id);
        if let Some(user_id) = owner {
            if inner.failing_users.contains(&user_id) {
                return Err(FeedsimError::db_operation(
                    "insert similar edge",
                    format!("store unavailable for user {}", user_id),
                ));
            }
        }

        let key = (edge.entry_id, edge.similar_entry_id);
        if inner.edges.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.edges.insert(key, edge.similarity);
        Ok(InsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, user_id: i64, feed_id: i64) -> Entry {
        Entry {
            id,
            user_id,
            feed_id,
            title: format!("entry {}", id),
            url: format!("https://example.com/{}", id),
            content: String::new(),
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let store = MemoryStore::new();
        store.add_entry(entry(1, 1, 1)).unwrap();
        store.add_entry(entry(2, 1, 1)).unwrap();

        let edge = SimilarityEdge::new(1, 2, 0.8);
        assert_eq!(
            store.insert_similar_edge(&edge).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_similar_edge(&edge).unwrap(),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(store.edges().unwrap().len(), 1);
    }

    #[test]
    fn test_list_similar_edges_direction_agnostic() {
        let store = MemoryStore::new();
        store
            .insert_similar_edge(&SimilarityEdge::new(1, 2, 0.5))
            .unwrap();
        store
            .insert_similar_edge(&SimilarityEdge::new(3, 1, 0.4))
            .unwrap();

        assert_eq!(store.list_similar_edges(1).unwrap().len(), 2);
        assert_eq!(store.list_similar_edges(2).unwrap().len(), 1);
        assert!(store.are_similar(2, 1).unwrap());
        assert!(store.are_similar(1, 3).unwrap());
        assert!(!store.are_similar(2, 3).unwrap());
    }

    #[test]
    fn test_list_entries_by_feed() {
        let store = MemoryStore::new();
        store.add_entry(entry(1, 1, 10)).unwrap();
        store.add_entry(entry(2, 1, 11)).unwrap();
        store.add_entry(entry(3, 2, 10)).unwrap();

        assert_eq!(store.list_entries(1, None).unwrap().len(), 2);
        let feed_entries = store.list_entries(1, Some(11)).unwrap();
        assert_eq!(feed_entries.len(), 1);
        assert_eq!(feed_entries[0].id, 2);
    }

    #[test]
    fn test_failing_user_inserts_error() {
        let store = MemoryStore::new();
        store.add_entry(entry(1, 7, 1)).unwrap();
        store.fail_inserts_for(7).unwrap();

        let err = store
            .insert_similar_edge(&SimilarityEdge::new(1, 2, 0.9))
            .unwrap_err();
        assert!(err.to_string().contains("user 7"));
        assert!(store.edges().unwrap().is_empty());
    }
}
