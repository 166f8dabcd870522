//! Date-bucketed folder path materialization.
//!
//! # Responsibility
//! - Walk the configured folder levels beneath a root container, reusing
//!   children whose alias matches and creating the missing ones.
//! - Append the item under the deepest folder.
//!
//! # Invariants
//! - Lookup is by alias among direct children; first match wins.
//! - The item being placed is never taken as one of its own folders, so the
//!   chain stays a simple path.
//! - Repeating a call with the same alias sequence creates no new folders.
//! - Generated folders sort by their numeric date component.

use crate::config::{FolderPart, PartFormats};
use crate::date_format::format_date;
use crate::model::resource::{Resource, ResourceId, TemplateId};
use crate::repo::resource_repo::{DuplicateOptions, ResourceStore, StoreResult};
use chrono::NaiveDateTime;
use log::{debug, info};

/// Result of one materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Deepest folder; the item's new parent.
    pub folder_id: ResourceId,
    /// Resolved folder chain below the root, outermost first.
    pub chain: Vec<ResourceId>,
    /// Folders created by this call.
    pub created: Vec<ResourceId>,
    /// Menu index assigned to the item.
    pub menu_index: i64,
}

/// Builds date folders under a root and re-parents items into them.
pub struct FolderMaterializer<'a, S: ResourceStore + ?Sized> {
    store: &'a S,
    generated_template: TemplateId,
    formats: &'a PartFormats,
}

struct ResolutionContext {
    item_id: ResourceId,
    current: Resource,
    chain: Vec<ResourceId>,
    created: Vec<ResourceId>,
}

impl<'a, S: ResourceStore + ?Sized> FolderMaterializer<'a, S> {
    pub fn new(store: &'a S, generated_template: TemplateId, formats: &'a PartFormats) -> Self {
        Self {
            store,
            generated_template,
            formats,
        }
    }

    /// Ensures the folder chain for `working_date` exists below `root` and
    /// moves `item` to the end of the deepest folder.
    ///
    /// An empty `structure` places the item directly under `root`.
    pub fn materialize(
        &self,
        item: &mut Resource,
        structure: &[FolderPart],
        root: Resource,
        working_date: &NaiveDateTime,
    ) -> StoreResult<Placement> {
        let mut ctx = ResolutionContext {
            item_id: item.id,
            current: root,
            chain: Vec::with_capacity(structure.len()),
            created: Vec::new(),
        };

        for part in structure {
            let next = self.resolve_level(&mut ctx, *part, working_date)?;
            ctx.chain.push(next.id);
            ctx.current = next;
        }

        let folder_id = ctx.current.id;
        let menu_index = self
            .store
            .list_children(folder_id)?
            .iter()
            .map(|child| child.menu_index)
            .fold(0, i64::max)
            + 1;

        item.menu_index = menu_index;
        item.parent = Some(folder_id);
        self.store.update_resource(item)?;

        info!(
            "event=resource_placed module=materializer status=ok resource={} folder={} created={} menu_index={}",
            item.id,
            folder_id,
            ctx.created.len(),
            menu_index
        );

        Ok(Placement {
            folder_id,
            chain: ctx.chain,
            created: ctx.created,
            menu_index,
        })
    }

    fn resolve_level(
        &self,
        ctx: &mut ResolutionContext,
        part: FolderPart,
        working_date: &NaiveDateTime,
    ) -> StoreResult<Resource> {
        let formats = self.formats.for_part(part);
        let alias = format_date(working_date, &formats.alias);
        let parent_id = ctx.current.id;
        let item_id = ctx.item_id;

        let existing = self
            .store
            .list_children(parent_id)?
            .into_iter()
            .find(|child| {
                child.id != item_id && child.parent == Some(parent_id) && child.alias == alias
            });
        if let Some(child) = existing {
            debug!(
                "event=folder_lookup module=materializer status=hit part={} alias={} folder={}",
                part.token(),
                alias,
                child.id
            );
            return Ok(child);
        }

        let title = format_date(working_date, &formats.title);
        let mut folder = self.store.duplicate_resource(
            parent_id,
            &DuplicateOptions {
                new_name: title.clone(),
                parent: Some(parent_id),
            },
        )?;
        folder.is_folder = true;
        folder.published = true;
        folder.searchable = false;
        folder.template = self.generated_template;
        folder.page_title = title.clone();
        folder.long_title = title.clone();
        folder.menu_title = title;
        folder.alias = alias;
        folder.menu_index = part.menu_index(working_date);
        self.store.update_resource(&folder)?;

        info!(
            "event=folder_create module=materializer status=ok part={} alias={} folder={} parent={}",
            part.token(),
            folder.alias,
            folder.id,
            parent_id
        );
        ctx.created.push(folder.id);
        Ok(folder)
    }
}
