//! Resource domain model.
//!
//! # Responsibility
//! - Define the canonical record for pages and generated date folders.
//! - Name the built-in timestamp columns that can drive folder placement.
//!
//! # Invariants
//! - `id` is stable and never reused for another resource.
//! - Timestamps are Unix seconds; `None` and `0` both mean "unset".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every resource in the content store.
pub type ResourceId = Uuid;

/// Template identifier as configured in the host system.
///
/// `0` is the host's "empty" template.
pub type TemplateId = i64;

/// Canonical content record for pages and folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    /// `None` means the resource sits at site root.
    pub parent: Option<ResourceId>,
    pub template: TemplateId,
    /// URL path segment; unique among siblings by convention.
    pub alias: String,
    pub page_title: String,
    pub long_title: String,
    pub menu_title: String,
    pub content: String,
    /// Sibling sort key. Lower sorts first.
    pub menu_index: i64,
    pub is_folder: bool,
    pub published: bool,
    pub searchable: bool,
    pub published_on: Option<i64>,
    pub pub_date: Option<i64>,
    pub unpub_date: Option<i64>,
    pub created_on: Option<i64>,
    pub edited_on: Option<i64>,
    pub deleted_on: Option<i64>,
}

impl Resource {
    /// Creates a new unpublished resource with a generated stable ID.
    pub fn new(template: TemplateId, page_title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: None,
            template,
            alias: String::new(),
            page_title: page_title.into(),
            long_title: String::new(),
            menu_title: String::new(),
            content: String::new(),
            menu_index: 0,
            is_folder: false,
            published: false,
            searchable: true,
            published_on: None,
            pub_date: None,
            unpub_date: None,
            created_on: None,
            edited_on: None,
            deleted_on: None,
        }
    }

    /// Builder-style parent assignment.
    pub fn under(mut self, parent: ResourceId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder-style alias assignment.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Reads one built-in timestamp column.
    ///
    /// Returns `None` for unset columns, including the host's `0` sentinel.
    pub fn timestamp(&self, field: BuiltinDateField) -> Option<i64> {
        let value = match field {
            BuiltinDateField::PublishedOn => self.published_on,
            BuiltinDateField::PubDate => self.pub_date,
            BuiltinDateField::UnpubDate => self.unpub_date,
            BuiltinDateField::CreatedOn => self.created_on,
            BuiltinDateField::EditedOn => self.edited_on,
            BuiltinDateField::DeletedOn => self.deleted_on,
        };
        value.filter(|seconds| *seconds != 0)
    }
}

/// Built-in temporal columns of a resource.
///
/// Any other date-field name refers to an extended attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinDateField {
    PublishedOn,
    PubDate,
    UnpubDate,
    CreatedOn,
    EditedOn,
    DeletedOn,
}

impl BuiltinDateField {
    /// Maps a configured field name to a built-in column, if it is one.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "publishedon" => Some(Self::PublishedOn),
            "pub_date" => Some(Self::PubDate),
            "unpub_date" => Some(Self::UnpubDate),
            "createdon" => Some(Self::CreatedOn),
            "editedon" => Some(Self::EditedOn),
            "deletedon" => Some(Self::DeletedOn),
            _ => None,
        }
    }
}
