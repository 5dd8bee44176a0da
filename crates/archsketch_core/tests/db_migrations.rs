use archsketch_core::db::migrations::latest_version;
use archsketch_core::db::{open_db, open_db_in_memory, DbError};
use archsketch_core::{KeyValueStore, ProjectStore, SqliteKeyValueStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archsketch.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_entries");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_key_is_rejected_by_schema_and_store() {
    let conn = open_db_in_memory().unwrap();
    let raw = conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('', 'x');",
        [],
    );
    assert!(raw.is_err());

    let store = SqliteKeyValueStore::new(conn);
    assert!(store.set_item("   ", "x").is_err());
}

#[test]
fn project_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.db");

    let created = {
        let kv = SqliteKeyValueStore::open(&path).unwrap();
        let mut store = ProjectStore::load(kv, "system_design_projects");
        store.create_project("Persisted", "kept on disk").unwrap()
    };

    let kv = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(kv.keys().unwrap(), vec!["system_design_projects".to_string()]);
    let store = ProjectStore::load(kv, "system_design_projects");
    assert_eq!(store.projects(), std::slice::from_ref(&created));
    assert_eq!(store.current_project(), Some(&created));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
