//! Resource save hook.
//!
//! # Responsibility
//! - Decide whether a saved resource qualifies for date-folder placement.
//! - Resolve its working date and delegate to [`FolderMaterializer`].
//!
//! # Invariants
//! - Configuration is validated before the store is touched.
//! - Non-qualifying resources are left unmodified.
//! - Date resolution failures abort placement.

use crate::config::{AutofolderConfig, ConfigError};
use crate::model::resource::{Resource, ResourceId};
use crate::repo::resource_repo::{ResourceStore, StoreError};
use crate::service::date_field::{read_working_date, resolve_field_name, DateFieldError};
use crate::service::materializer::{FolderMaterializer, Placement};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a saved resource was left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Item template is not in the filter list.
    ItemTemplateNotFiltered,
    /// Item has no parent, or the parent does not exist.
    ParentNotFound,
    /// Parent template is not a configured parent template.
    ParentTemplateMismatch,
}

/// Outcome of one save-hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Skipped(SkipReason),
    Placed(Placement),
}

/// Errors that abort the save hook.
#[derive(Debug)]
pub enum AutofolderError {
    /// Configuration failed validation.
    Config(ConfigError),
    /// Working date could not be resolved.
    DateField(DateFieldError),
    /// Item to handle does not exist.
    ResourceNotFound(ResourceId),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for AutofolderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::DateField(err) => write!(f, "{err}"),
            Self::ResourceNotFound(id) => write!(f, "resource not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AutofolderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::DateField(err) => Some(err),
            Self::ResourceNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AutofolderError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DateFieldError> for AutofolderError {
    fn from(value: DateFieldError) -> Self {
        match value {
            DateFieldError::Store(err) => Self::Store(err),
            other => Self::DateField(other),
        }
    }
}

impl From<StoreError> for AutofolderError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Save-hook facade over a resource store.
pub struct AutofolderService<S: ResourceStore> {
    store: S,
    config: AutofolderConfig,
}

impl<S: ResourceStore> AutofolderService<S> {
    /// Creates the hook, rejecting invalid configuration up front.
    pub fn new(store: S, config: AutofolderConfig) -> Result<Self, AutofolderError> {
        if let Err(err) = config.validate() {
            error!("event=hook_init module=autofolder status=error error={err}");
            return Err(err.into());
        }
        Ok(Self { store, config })
    }

    /// Loads a resource by id and runs [`Self::handle_save`] on it.
    pub fn handle_save_by_id(&self, id: ResourceId) -> Result<SaveOutcome, AutofolderError> {
        let mut item = self
            .store
            .get_resource(id)?
            .ok_or(AutofolderError::ResourceNotFound(id))?;
        self.handle_save(&mut item)
    }

    /// Places a just-saved resource under its date folder when it qualifies.
    ///
    /// On `Placed`, `item` carries its new parent and menu index and has been
    /// persisted.
    pub fn handle_save(&self, item: &mut Resource) -> Result<SaveOutcome, AutofolderError> {
        if !self.config.filters_template(item.template) {
            info!(
                "event=hook_skip module=autofolder status=skipped reason=template_not_filtered resource={} template={}",
                item.id, item.template
            );
            return Ok(SaveOutcome::Skipped(SkipReason::ItemTemplateNotFiltered));
        }

        let parent = match item.parent {
            Some(parent_id) => self.store.get_resource(parent_id)?,
            None => None,
        };
        let Some(parent) = parent else {
            info!(
                "event=hook_skip module=autofolder status=skipped reason=parent_not_found resource={}",
                item.id
            );
            return Ok(SaveOutcome::Skipped(SkipReason::ParentNotFound));
        };

        if !self.config.is_parent_template(parent.template) {
            info!(
                "event=hook_skip module=autofolder status=skipped reason=parent_template_mismatch resource={} parent_template={}",
                item.id, parent.template
            );
            return Ok(SaveOutcome::Skipped(SkipReason::ParentTemplateMismatch));
        }

        let working_date = match self.working_date(item, &parent) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=hook_date module=autofolder status=error resource={} error={}",
                    item.id, err
                );
                return Err(err.into());
            }
        };

        let materializer = FolderMaterializer::new(
            &self.store,
            self.config.generated_template,
            &self.config.formats,
        );
        let placement = materializer.materialize(
            item,
            &self.config.folder_structure,
            parent,
            &working_date,
        )?;
        Ok(SaveOutcome::Placed(placement))
    }

    fn working_date(
        &self,
        item: &Resource,
        parent: &Resource,
    ) -> Result<chrono::NaiveDateTime, DateFieldError> {
        let field = resolve_field_name(
            parent.template,
            &self.config.parent_templates,
            &self.config.date_fields,
        )
        .ok_or(DateFieldError::NoDateField)?;
        read_working_date(&self.store, item, field)
    }
}
