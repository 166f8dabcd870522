//! SQLite bootstrap for the resource store.
//!
//! # Responsibility
//! - Open connections, migrate them and confirm the resource schema is
//!   complete before any store is built on top.
//!
//! # Invariants
//! - A connection handed out by [`open_db`] / [`open_db_in_memory`] has
//!   passed [`migrations::verify_schema`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer binary.
    SchemaTooNew { found: u32, supported: u32 },
    /// Database has not been migrated to the version this binary expects.
    SchemaOutdated { found: u32, expected: u32 },
    /// One migration script failed; nothing from it was committed.
    MigrationFailed {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// A table (or one of its columns, when `column` is set) the resource
    /// store reads is missing.
    SchemaIncomplete {
        table: &'static str,
        column: Option<&'static str>,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "resource schema version {found} is newer than supported {supported}"
            ),
            Self::SchemaOutdated { found, expected } => write!(
                f,
                "resource schema version {found} found, {expected} required; run migrations first"
            ),
            Self::MigrationFailed {
                version,
                name,
                source,
            } => write!(f, "migration {version} ({name}) failed: {source}"),
            Self::SchemaIncomplete {
                table,
                column: Some(column),
            } => write!(f, "resource schema is missing column `{table}.{column}`"),
            Self::SchemaIncomplete {
                table,
                column: None,
            } => write!(f, "resource schema is missing table `{table}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::MigrationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
