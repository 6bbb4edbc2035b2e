//! End-to-end tests for `calc-similarity` and `similar`

mod support;

use predicates::prelude::*;
use support::{edge_count, feedsim_in, setup_seeded_dir, write_file};

#[test]
fn test_calc_similarity_creates_edges() {
    let dir = setup_seeded_dir();

    feedsim_in(&dir)
        .args(["calc-similarity", "--threshold", "0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice (1): 1 new edge(s)"))
        .stdout(predicate::str::contains("bob (2): 1 new edge(s)"))
        .stdout(predicate::str::contains("Created 2 similarity edge(s)"));

    assert_eq!(edge_count(&dir), 2);
}

#[test]
fn test_calc_similarity_is_idempotent() {
    let dir = setup_seeded_dir();
    feedsim_in(&dir).arg("calc-similarity").assert().success();

    feedsim_in(&dir)
        .arg("calc-similarity")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 0 similarity edge(s)"))
        .stdout(predicate::str::contains("1 already stored"));

    assert_eq!(edge_count(&dir), 2);
}

#[test]
fn test_calc_similarity_per_feed() {
    let dir = setup_seeded_dir();

    feedsim_in(&dir)
        .args(["calc-similarity", "--per-feed", "--workers", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 1 similarity edge(s)"));

    assert_eq!(edge_count(&dir), 1);
}

#[test]
fn test_calc_similarity_json_report() {
    let dir = setup_seeded_dir();

    let output = feedsim_in(&dir)
        .args(["--format", "json", "calc-similarity"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total_created"], 2);
    assert_eq!(report["scope"], "user");
    assert_eq!(report["users"].as_array().unwrap().len(), 2);
    assert_eq!(report["users"][0]["candidates"], 1);
}

#[test]
fn test_calc_similarity_rejects_bad_threshold() {
    let dir = setup_seeded_dir();

    feedsim_in(&dir)
        .args(["calc-similarity", "--threshold", "1.5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid threshold"));

    assert_eq!(edge_count(&dir), 0);
}

#[test]
fn test_calc_similarity_reads_config_file() {
    let dir = setup_seeded_dir();
    let config = write_file(dir.path(), "feedsim.toml", "threshold = 0.99\nworkers = 1\n");

    // Only the identical pair reaches 0.99
    feedsim_in(&dir)
        .arg("--config")
        .arg(&config)
        .arg("calc-similarity")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 1 similarity edge(s)"));
}

#[test]
fn test_calc_similarity_flag_overrides_config() {
    let dir = setup_seeded_dir();
    let config = write_file(dir.path(), "feedsim.toml", "threshold = 0.99\n");

    feedsim_in(&dir)
        .arg("--config")
        .arg(&config)
        .args(["calc-similarity", "--threshold", "0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 2 similarity edge(s)"));
}

#[test]
fn test_calc_similarity_bad_config_key() {
    let dir = setup_seeded_dir();
    let config = write_file(dir.path(), "feedsim.toml", "treshold = 0.5\n");

    feedsim_in(&dir)
        .arg("--config")
        .arg(&config)
        .arg("calc-similarity")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_similar_lists_both_directions() {
    let dir = setup_seeded_dir();
    feedsim_in(&dir).arg("calc-similarity").assert().success();

    feedsim_in(&dir)
        .args(["similar", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/1"));

    feedsim_in(&dir)
        .args(["similar", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/2"));
}

#[test]
fn test_similar_identical_entries_score_one() {
    let dir = setup_seeded_dir();
    feedsim_in(&dir).arg("calc-similarity").assert().success();

    let output = feedsim_in(&dir)
        .args(["--format", "json", "similar", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["similar"][0]["entry_id"], 5);
    assert_eq!(json["similar"][0]["similarity"], 1.0);
}

#[test]
fn test_similar_none_found() {
    let dir = setup_seeded_dir();
    feedsim_in(&dir)
        .args(["similar", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No similar entries for 3"));
}

#[test]
fn test_similar_unknown_entry() {
    let dir = setup_seeded_dir();
    feedsim_in(&dir)
        .args(["similar", "999"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("entry not found: 999"));
}
