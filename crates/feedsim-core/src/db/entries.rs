use std::fs;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::{FeedsimError, Result};
use crate::store::{Entry, Feed, User};

/// Users, feeds and entries to load with `feedsim import`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportFile {
    pub users: Vec<User>,
    pub feeds: Vec<Feed>,
    pub entries: Vec<Entry>,
}

impl ImportFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| FeedsimError::io_operation("read import file", path.display(), e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub users: usize,
    pub feeds: usize,
    pub entries: usize,
}

/// Read entry content, treating unreadable values as empty text
fn content_or_empty(row: &Row, idx: usize, entry_id: i64) -> Result<String> {
    let value = row
        .get_ref(idx)
        .map_err(|e| FeedsimError::field_extraction("content", e))?;
    match value {
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => {
                tracing::warn!(entry_id, error = %e, "entry content is not valid UTF-8, using empty content");
                Ok(String::new())
            }
        },
        ValueRef::Null => Ok(String::new()),
        other => {
            tracing::warn!(entry_id, kind = ?other.data_type(), "entry content is not text, using empty content");
            Ok(String::new())
        }
    }
}

fn entry_from_row(row: &Row) -> Result<Entry> {
    let id: i64 = row
        .get(0)
        .map_err(|e| FeedsimError::field_extraction("id", e))?;
    Ok(Entry {
        id,
        user_id: row
            .get(1)
            .map_err(|e| FeedsimError::field_extraction("user_id", e))?,
        feed_id: row
            .get(2)
            .map_err(|e| FeedsimError::field_extraction("feed_id", e))?,
        title: row
            .get(3)
            .map_err(|e| FeedsimError::field_extraction("title", e))?,
        url: row
            .get(4)
            .map_err(|e| FeedsimError::field_extraction("url", e))?,
        content: content_or_empty(row, 5, id)?,
    })
}

impl super::Database {
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username FROM users ORDER BY id")
            .map_err(|e| crate::map_db_err!("prepare users query", e))?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            })
            .map_err(|e| crate::map_db_err!("execute users query", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("read user", e))?;
        Ok(users)
    }

    pub fn list_feeds(&self, user_id: i64) -> Result<Vec<Feed>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, title FROM feeds WHERE user_id = ?1 ORDER BY id")
            .map_err(|e| crate::map_db_err!("prepare feeds query", e))?;
        let feeds = stmt
            .query_map(params![user_id], |row| {
                Ok(Feed {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                })
            })
            .map_err(|e| crate::map_db_err!("execute feeds query", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| crate::map_db_err!("read feed", e))?;
        Ok(feeds)
    }

    pub fn list_entries(&self, user_id: i64, feed_id: Option<i64>) -> Result<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, feed_id, title, url, content FROM entries
                 WHERE user_id = ?1 AND (?2 IS NULL OR feed_id = ?2)
                 ORDER BY id",
            )
            .map_err(|e| crate::map_db_err!("prepare entries query", e))?;

        let mut rows = stmt
            .query(params![user_id, feed_id])
            .map_err(|e| crate::map_db_err!("execute entries query", e))?;

        let mut entries = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| crate::map_db_err!("read entry", e))?
        {
            entries.push(entry_from_row(row)?);
        }
        Ok(entries)
    }

    pub fn get_entry(&self, entry_id: i64) -> Result<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, feed_id, title, url, content FROM entries WHERE id = ?1")
            .map_err(|e| crate::map_db_err!("prepare entry query", e))?;
        let mut rows = stmt
            .query(params![entry_id])
            .map_err(|e| crate::map_db_err!("execute entry query", e))?;
        match rows
            .next()
            .map_err(|e| crate::map_db_err!("read entry", e))?
        {
            Some(row) => Ok(Some(entry_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn user_exists(&self, user_id: i64) -> Result<bool> {
        self.conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| Ok(()))
            .optional()
            .map(|found| found.is_some())
            .map_err(|e| crate::map_db_err!("look up user", e))
    }

    /// Load an import file in one transaction; rows with an existing id are
    /// replaced
    pub fn import(&self, file: &ImportFile) -> Result<ImportSummary> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| crate::map_db_err!("begin import", e))?;

        for user in &file.users {
            tx.execute(
                "INSERT INTO users (id, username) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET username = excluded.username",
                params![user.id, user.username],
            )
            .map_err(|e| crate::map_db_err!("import user", e))?;
        }

        for feed in &file.feeds {
            if !self.user_exists(feed.user_id)? {
                return Err(FeedsimError::invalid_value(
                    "feed owner",
                    format!("feed {} references unknown user {}", feed.id, feed.user_id),
                ));
            }
            tx.execute(
                "INSERT INTO feeds (id, user_id, title) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id, title = excluded.title",
                params![feed.id, feed.user_id, feed.title],
            )
            .map_err(|e| crate::map_db_err!("import feed", e))?;
        }

        for entry in &file.entries {
            if !self.user_exists(entry.user_id)? {
                return Err(FeedsimError::invalid_value(
                    "entry owner",
                    format!("entry {} references unknown user {}", entry.id, entry.user_id),
                ));
            }
            tx.execute(
                "INSERT INTO entries (id, user_id, feed_id, title, url, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    feed_id = excluded.feed_id,
                    title = excluded.title,
                    url = excluded.url,
                    content = excluded.content",
                params![
                    entry.id,
                    entry.user_id,
                    entry.feed_id,
                    entry.title,
                    entry.url,
                    entry.content
                ],
            )
            .map_err(|e| crate::map_db_err!("import entry", e))?;
        }

        tx.commit()
            .map_err(|e| crate::map_db_err!("commit import", e))?;

        let summary = ImportSummary {
            users: file.users.len(),
            feeds: file.feeds.len(),
            entries: file.entries.len(),
        };
        tracing::info!(
            users = summary.users,
            feeds = summary.feeds,
            entries = summary.entries,
            "import complete"
        );
        Ok(summary)
    }
}
