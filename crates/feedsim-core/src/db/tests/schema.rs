use crate::db::schema::{force_set_schema_version, read_schema_version};
use crate::db::*;
use tempfile::tempdir;

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_schema_version().unwrap(), CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_create_schema_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(create_schema(&db.conn).unwrap(), SchemaState::Current);
}

#[test]
fn test_empty_connection_has_no_version() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    assert_eq!(read_schema_version(&conn).unwrap(), None);
    assert_eq!(create_schema(&conn).unwrap(), SchemaState::Created);
    assert_eq!(
        read_schema_version(&conn).unwrap(),
        Some(CURRENT_SCHEMA_VERSION)
    );
}

#[test]
fn test_unsupported_version_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("feedsim.db");
    {
        let db = Database::create(&path).unwrap();
        force_set_schema_version(&db.conn, CURRENT_SCHEMA_VERSION + 1).unwrap();
    }

    let err = Database::open(&path).unwrap_err();
    assert!(err.to_string().contains("not supported"));
}
