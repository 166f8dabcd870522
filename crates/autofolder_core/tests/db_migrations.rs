use autofolder_core::db::migrations::{apply_migrations, latest_version, verify_schema};
use autofolder_core::db::{open_db, open_db_in_memory, DbError};
use autofolder_core::{Resource, ResourceStore, SqliteResourceStore, StoreError};
use rusqlite::Connection;

fn set_user_version(conn: &Connection, version: u32) {
    conn.pragma_update(None, "user_version", version).unwrap();
}

#[test]
fn opened_connection_passes_schema_verification() {
    let conn = open_db_in_memory().unwrap();

    verify_schema(&conn).unwrap();
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn applying_migrations_to_current_schema_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();

    apply_migrations(&mut conn).unwrap();
    verify_schema(&conn).unwrap();
}

#[test]
fn resources_survive_reopening_the_store_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("content.sqlite3");
    let blog = Resource::new(2, "Blog").with_alias("blog");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteResourceStore::try_new(&conn).unwrap();
        store.create_resource(&blog).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    assert_eq!(store.get_resource(blog.id).unwrap(), Some(blog));
}

#[test]
fn store_file_from_newer_binary_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    set_user_version(&Connection::open(&path).unwrap(), latest_version() + 1);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaTooNew { found, supported }
            if found == latest_version() + 1 && supported == latest_version()
    ));
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteResourceStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        StoreError::Db(DbError::SchemaOutdated { found: 0, expected }) if expected == latest_version()
    ));
}

#[test]
fn verification_reports_missing_table() {
    let conn = Connection::open_in_memory().unwrap();
    set_user_version(&conn, latest_version());

    let err = verify_schema(&conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaIncomplete {
            table: "resources",
            column: None
        }
    ));
}

#[test]
fn verification_reports_first_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE resources (uuid TEXT PRIMARY KEY NOT NULL, alias TEXT);
         CREATE TABLE resource_values (resource_uuid TEXT, name TEXT, value TEXT);",
    )
    .unwrap();
    set_user_version(&conn, latest_version());

    let err = verify_schema(&conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaIncomplete {
            table: "resources",
            column: Some("parent_uuid")
        }
    ));
    assert_eq!(
        err.to_string(),
        "resource schema is missing column `resources.parent_uuid`"
    );
}
