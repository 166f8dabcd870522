//! Date-folder placement for content-store save hooks.
//!
//! When a resource is saved under a configured container template, the hook
//! ensures a `year/month/day` style folder chain exists below that container
//! and moves the resource into the deepest folder.

pub mod config;
pub mod date_format;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{
    AutofolderConfig, AutofolderProperties, ConfigError, FolderPart, FormatPair, PartFormats,
};
pub use date_format::{format_date, DateFormatError};
pub use logging::{default_log_level, init_logging};
pub use model::resource::{BuiltinDateField, Resource, ResourceId, TemplateId};
pub use repo::resource_repo::{
    DuplicateOptions, ResourceStore, SqliteResourceStore, StoreError, StoreResult,
};
pub use service::autofolder_service::{
    AutofolderError, AutofolderService, SaveOutcome, SkipReason,
};
pub use service::date_field::{DateFieldError, DateSource};
pub use service::materializer::{FolderMaterializer, Placement};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
