mod schema;

use crate::db::{Database, ImportFile};
use crate::store::{Entry, Feed, User};

/// Two users, three feeds, five entries
pub(super) fn sample_import() -> ImportFile {
    let entry = |id: i64, user_id: i64, feed_id: i64, title: &str, content: &str| Entry {
        id,
        user_id,
        feed_id,
        title: title.to_string(),
        url: format!("https://example.com/{}", id),
        content: content.to_string(),
    };
    ImportFile {
        users: vec![
            User {
                id: 1,
                username: "alice".to_string(),
            },
            User {
                id: 2,
                username: "bob".to_string(),
            },
        ],
        feeds: vec![
            Feed {
                id: 10,
                user_id: 1,
                title: "news".to_string(),
            },
            Feed {
                id: 11,
                user_id: 1,
                title: "blogs".to_string(),
            },
            Feed {
                id: 20,
                user_id: 2,
                title: "tech".to_string(),
            },
        ],
        entries: vec![
            entry(1, 1, 10, "Cat", "cat dog bird"),
            entry(2, 1, 11, "Cat", "cat dog fish"),
            entry(3, 1, 10, "", "totally unrelated text"),
            entry(4, 2, 20, "Same", "<p>same text</p>"),
            entry(5, 2, 20, "Same", "same text"),
        ],
    }
}

pub(super) fn seeded_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.import(&sample_import()).unwrap();
    db
}
