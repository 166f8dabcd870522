//! Resource store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide fetch-by-id, fetch-children, create, update and duplicate
//!   capabilities over the resource tree.
//! - Provide extended-attribute (template variable) lookup.
//!
//! # Invariants
//! - Child listing is deterministic: `menu_index ASC`, then insertion order.
//! - Duplicates never copy children.
//! - No locking is performed across calls. Two callers creating the same
//!   missing alias under one parent can both succeed and leave duplicate
//!   siblings; callers needing exactly-once creation must serialize
//!   externally.

use crate::db::migrations::verify_schema;
use crate::db::DbError;
use crate::model::resource::{Resource, ResourceId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RESOURCE_SELECT_SQL: &str = "SELECT
    uuid,
    parent_uuid,
    template_id,
    alias,
    page_title,
    long_title,
    menu_title,
    content,
    menu_index,
    is_folder,
    published,
    searchable,
    published_on,
    pub_date,
    unpub_date,
    created_on,
    edited_on,
    deleted_on
FROM resources";

/// Result type used by resource store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from resource store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target resource does not exist.
    NotFound(ResourceId),
    /// Persisted data cannot be converted to a valid resource.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "resource not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid resource data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Overrides applied when duplicating a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateOptions {
    /// Page title of the copy.
    pub new_name: String,
    /// Parent of the copy.
    pub parent: Option<ResourceId>,
}

/// Content store capability set consumed by the save hook.
pub trait ResourceStore {
    /// Loads one resource by id.
    fn get_resource(&self, id: ResourceId) -> StoreResult<Option<Resource>>;
    /// Lists direct children of `parent` in store default order.
    fn list_children(&self, parent: ResourceId) -> StoreResult<Vec<Resource>>;
    /// Persists a new resource.
    fn create_resource(&self, resource: &Resource) -> StoreResult<()>;
    /// Persists changes to an existing resource.
    fn update_resource(&self, resource: &Resource) -> StoreResult<()>;
    /// Copies `source` (fields and extended values, not children) and
    /// persists the copy.
    fn duplicate_resource(
        &self,
        source: ResourceId,
        options: &DuplicateOptions,
    ) -> StoreResult<Resource>;
    /// Reads one extended attribute value.
    fn get_extended_value(&self, id: ResourceId, name: &str) -> StoreResult<Option<String>>;
    /// Writes one extended attribute value.
    fn set_extended_value(&self, id: ResourceId, name: &str, value: &str) -> StoreResult<()>;
}

/// SQLite-backed resource store.
pub struct SqliteResourceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        verify_schema(conn)?;
        Ok(Self { conn })
    }
}

impl ResourceStore for SqliteResourceStore<'_> {
    fn get_resource(&self, id: ResourceId) -> StoreResult<Option<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row)?));
        }
        Ok(None)
    }

    fn list_children(&self, parent: ResourceId) -> StoreResult<Vec<Resource>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESOURCE_SELECT_SQL} WHERE parent_uuid = ?1 ORDER BY menu_index ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([parent.to_string()])?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_resource_row(row)?);
        }
        Ok(items)
    }

    fn create_resource(&self, resource: &Resource) -> StoreResult<()> {
        insert_resource(self.conn, resource)
    }

    fn update_resource(&self, resource: &Resource) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE resources
             SET parent_uuid = ?2,
                 template_id = ?3,
                 alias = ?4,
                 page_title = ?5,
                 long_title = ?6,
                 menu_title = ?7,
                 content = ?8,
                 menu_index = ?9,
                 is_folder = ?10,
                 published = ?11,
                 searchable = ?12,
                 published_on = ?13,
                 pub_date = ?14,
                 unpub_date = ?15,
                 created_on = ?16,
                 edited_on = ?17,
                 deleted_on = ?18
             WHERE uuid = ?1;",
            params![
                resource.id.to_string(),
                resource.parent.map(|value| value.to_string()),
                resource.template,
                resource.alias,
                resource.page_title,
                resource.long_title,
                resource.menu_title,
                resource.content,
                resource.menu_index,
                resource.is_folder,
                resource.published,
                resource.searchable,
                resource.published_on,
                resource.pub_date,
                resource.unpub_date,
                resource.created_on,
                resource.edited_on,
                resource.deleted_on,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(resource.id));
        }
        Ok(())
    }

    fn duplicate_resource(
        &self,
        source: ResourceId,
        options: &DuplicateOptions,
    ) -> StoreResult<Resource> {
        let original = self
            .get_resource(source)?
            .ok_or(StoreError::NotFound(source))?;

        let mut copy = original.clone();
        copy.id = Uuid::new_v4();
        copy.parent = options.parent;
        copy.page_title = options.new_name.clone();
        copy.alias = String::new();
        copy.created_on = Some(chrono::Utc::now().timestamp());
        copy.edited_on = None;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_resource(&tx, &copy)?;
        tx.execute(
            "INSERT INTO resource_values (resource_uuid, name, value)
             SELECT ?2, name, value
             FROM resource_values
             WHERE resource_uuid = ?1;",
            params![source.to_string(), copy.id.to_string()],
        )?;
        tx.commit()?;

        Ok(copy)
    }

    fn get_extended_value(&self, id: ResourceId, name: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value
                 FROM resource_values
                 WHERE resource_uuid = ?1
                   AND name = ?2;",
                params![id.to_string(), name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_extended_value(&self, id: ResourceId, name: &str, value: &str) -> StoreResult<()> {
        if self.get_resource(id)?.is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.conn.execute(
            "INSERT INTO resource_values (resource_uuid, name, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(resource_uuid, name) DO UPDATE SET value = excluded.value;",
            params![id.to_string(), name, value],
        )?;
        Ok(())
    }
}

fn insert_resource(conn: &Connection, resource: &Resource) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO resources (
            uuid,
            parent_uuid,
            template_id,
            alias,
            page_title,
            long_title,
            menu_title,
            content,
            menu_index,
            is_folder,
            published,
            searchable,
            published_on,
            pub_date,
            unpub_date,
            created_on,
            edited_on,
            deleted_on
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18);",
        params![
            resource.id.to_string(),
            resource.parent.map(|value| value.to_string()),
            resource.template,
            resource.alias,
            resource.page_title,
            resource.long_title,
            resource.menu_title,
            resource.content,
            resource.menu_index,
            resource.is_folder,
            resource.published,
            resource.searchable,
            resource.published_on,
            resource.pub_date,
            resource.unpub_date,
            resource.created_on,
            resource.edited_on,
            resource.deleted_on,
        ],
    )?;
    Ok(())
}

fn parse_resource_row(row: &Row<'_>) -> StoreResult<Resource> {
    let id_text: String = row.get("uuid")?;
    let id = parse_uuid(&id_text, "resources.uuid")?;
    let parent = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "resources.parent_uuid"))
        .transpose()?;

    Ok(Resource {
        id,
        parent,
        template: row.get("template_id")?,
        alias: row.get("alias")?,
        page_title: row.get("page_title")?,
        long_title: row.get("long_title")?,
        menu_title: row.get("menu_title")?,
        content: row.get("content")?,
        menu_index: row.get("menu_index")?,
        is_folder: parse_flag(row, "is_folder")?,
        published: parse_flag(row, "published")?,
        searchable: parse_flag(row, "searchable")?,
        published_on: row.get("published_on")?,
        pub_date: row.get("pub_date")?,
        unpub_date: row.get("unpub_date")?,
        created_on: row.get("created_on")?,
        edited_on: row.get("edited_on")?,
        deleted_on: row.get("deleted_on")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid flag value `{other}` in resources.{column}"
        ))),
    }
}

fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
