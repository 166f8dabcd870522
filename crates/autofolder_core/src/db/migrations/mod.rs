//! Resource schema migrations and schema verification.
//!
//! # Responsibility
//! - Bring a connection up to the resource schema, one script at a time.
//! - Confirm every table and column the resource store reads is present.
//!
//! # Invariants
//! - Each migration commits together with its `PRAGMA user_version` bump, so
//!   a failed script leaves the previous version intact.
//! - `REQUIRED_SCHEMA` lists exactly the columns `SqliteResourceStore` reads.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::collections::HashSet;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "resources",
        sql: include_str!("0001_resources.sql"),
    },
    Migration {
        version: 2,
        name: "resource_values",
        sql: include_str!("0002_resource_values.sql"),
    },
];

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "resources",
        &[
            "uuid",
            "parent_uuid",
            "template_id",
            "alias",
            "page_title",
            "long_title",
            "menu_title",
            "content",
            "menu_index",
            "is_folder",
            "published",
            "searchable",
            "published_on",
            "pub_date",
            "unpub_date",
            "created_on",
            "edited_on",
            "deleted_on",
        ],
    ),
    ("resource_values", &["resource_uuid", "name", "value"]),
];

/// Schema version this binary migrates to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Runs every migration newer than the connection's `user_version`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > found) {
        run_migration(conn, migration).map_err(|source| DbError::MigrationFailed {
            version: migration.version,
            name: migration.name,
            source,
        })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

/// Checks that `conn` is at [`latest_version`] and carries every table and
/// column the resource store reads.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    let found = user_version(conn)?;
    let expected = latest_version();
    if found != expected {
        return Err(DbError::SchemaOutdated { found, expected });
    }

    for &(table, columns) in REQUIRED_SCHEMA {
        let present = table_columns(conn, table)?;
        if present.is_empty() {
            return Err(DbError::SchemaIncomplete {
                table,
                column: None,
            });
        }
        if let Some(&missing) = columns.iter().find(|column| !present.contains(**column)) {
            return Err(DbError::SchemaIncomplete {
                table,
                column: Some(missing),
            });
        }
    }
    Ok(())
}

fn run_migration(conn: &mut Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()
}

fn user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;
    Ok(names)
}
