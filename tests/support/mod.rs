#![allow(dead_code)]

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for feedsim
pub fn feedsim() -> Command {
    cargo_bin_cmd!("feedsim")
}

/// Path of the scratch database inside `dir`
pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("feedsim.db")
}

/// A Command already pointed at the scratch database
pub fn feedsim_in(dir: &TempDir) -> Command {
    let mut cmd = feedsim();
    cmd.current_dir(dir.path())
        .env_remove("FEEDSIM_DB")
        .env_remove("FEEDSIM_CONFIG")
        .env_remove("FEEDSIM_LOG")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(db_path(dir));
    cmd
}

pub const SAMPLE_IMPORT: &str = r#"{
    "users": [
        {"id": 1, "username": "alice"},
        {"id": 2, "username": "bob"}
    ],
    "feeds": [
        {"id": 10, "user_id": 1, "title": "news"},
        {"id": 11, "user_id": 1, "title": "blogs"},
        {"id": 20, "user_id": 2, "title": "tech"}
    ],
    "entries": [
        {"id": 1, "user_id": 1, "feed_id": 10, "title": "Cat", "url": "https://example.com/1", "content": "cat dog bird"},
        {"id": 2, "user_id": 1, "feed_id": 11, "title": "Cat", "url": "https://example.com/2", "content": "cat dog fish"},
        {"id": 3, "user_id": 1, "feed_id": 10, "title": "", "url": "https://example.com/3", "content": "totally unrelated text"},
        {"id": 4, "user_id": 2, "feed_id": 20, "title": "Same", "url": "https://example.com/4", "content": "<p>same text</p>"},
        {"id": 5, "user_id": 2, "feed_id": 20, "title": "Same", "url": "https://example.com/5", "content": "same text"}
    ]
}"#;

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Initialize a database and load the sample users, feeds and entries
pub fn setup_seeded_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    feedsim_in(&dir).arg("init").assert().success();
    let import = write_file(dir.path(), "import.json", SAMPLE_IMPORT);
    feedsim_in(&dir).arg("import").arg(import).assert().success();
    dir
}

/// Count rows in `entry_similar`
pub fn edge_count(dir: &TempDir) -> i64 {
    let conn = rusqlite::Connection::open(db_path(dir)).unwrap();
    conn.query_row("SELECT COUNT(*) FROM entry_similar", [], |r| r.get(0))
        .unwrap()
}
