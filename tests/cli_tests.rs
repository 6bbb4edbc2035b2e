//! Integration tests for the feedsim CLI

mod support;

use predicates::prelude::*;
use support::{feedsim, feedsim_in, setup_seeded_dir, write_file};
use tempfile::tempdir;

#[test]
fn test_help_flag() {
    feedsim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: feedsim"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("calc-similarity"))
        .stdout(predicate::str::contains("similar"));
}

#[test]
fn test_version_flag() {
    feedsim()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("feedsim"));
}

#[test]
fn test_no_command_prints_banner() {
    feedsim()
        .assert()
        .success()
        .stdout(predicate::str::contains("Run `feedsim --help`"));
}

#[test]
fn test_init_creates_database() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized feedsim database"));
    assert!(dir.path().join("feedsim.db").exists());

    // Running again is harmless
    feedsim_in(&dir).arg("init").assert().success();
}

#[test]
fn test_init_json_output() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir)
        .args(["--format", "json", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"ok\""))
        .stdout(predicate::str::contains("\"schema_version\": 1"));
}

#[test]
fn test_missing_database_exit_code() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir)
        .arg("calc-similarity")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("database not found"));
}

#[test]
fn test_missing_database_json_error() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir)
        .args(["--format", "json", "similar", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"type\":\"database_not_found\""));
}

#[test]
fn test_unknown_flag_json_is_usage_error() {
    feedsim()
        .args(["--format", "json", "calc-similarity", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("usage_error"));
}

#[test]
fn test_import_reports_counts() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir).arg("init").assert().success();
    let file = write_file(dir.path(), "import.json", support::SAMPLE_IMPORT);

    feedsim_in(&dir)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 user(s), 3 feed(s), 5 entry(ies)"));
}

#[test]
fn test_import_json_output() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir).arg("init").assert().success();
    let file = write_file(dir.path(), "import.json", support::SAMPLE_IMPORT);

    feedsim_in(&dir)
        .args(["--format", "json", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entries\": 5"));
}

#[test]
fn test_import_malformed_json() {
    let dir = tempdir().unwrap();
    feedsim_in(&dir).arg("init").assert().success();
    let file = write_file(dir.path(), "bad.json", "{ not json");

    feedsim_in(&dir)
        .arg("import")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_quiet_suppresses_output() {
    let dir = setup_seeded_dir();
    feedsim_in(&dir)
        .args(["--quiet", "init"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_db_from_env() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("from-env.db");
    feedsim()
        .current_dir(dir.path())
        .env("FEEDSIM_DB", &path)
        .arg("init")
        .assert()
        .success();
    assert!(path.exists());
}
