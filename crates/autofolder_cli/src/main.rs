//! Command-line driver for the date-folder save hook.
//!
//! # Responsibility
//! - Stand in for the host's save event: run the hook against a resource in
//!   a SQLite content store.
//! - Provide small helpers to seed and inspect that store.

use anyhow::{anyhow, bail, Context, Result};
use autofolder_core::db::open_db;
use autofolder_core::service::date_field::parse_date_value;
use autofolder_core::{
    init_logging, AutofolderConfig, AutofolderProperties, AutofolderService, Resource,
    ResourceId, ResourceStore, SaveOutcome, SqliteResourceStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "autofolder", version, about = "Date-folder placement for saved resources")]
struct Cli {
    /// SQLite content store.
    #[arg(long, env = "AUTOFOLDER_DB", default_value = "autofolder.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "AUTOFOLDER_LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, default_value_t = autofolder_core::default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Creates the store and applies migrations.
    Init,
    /// Adds one resource and prints its id.
    Add {
        #[arg(long)]
        template: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        parent: Option<ResourceId>,
        #[arg(long, default_value = "")]
        alias: String,
        /// Publish date, e.g. `2023-06-15` or a Unix timestamp.
        #[arg(long)]
        published_on: Option<String>,
        #[arg(long)]
        folder: bool,
    },
    /// Runs the save hook for one resource.
    Place {
        /// Hook properties in TOML.
        #[arg(long)]
        config: PathBuf,
        id: ResourceId,
    },
    /// Prints the subtree below one resource.
    Tree { root: ResourceId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir).map_err(|err| anyhow!(err))?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open store `{}`", cli.db.display()))?;
    let store = SqliteResourceStore::try_new(&conn)?;

    match cli.command {
        Command::Init => {
            println!("store ready: {}", cli.db.display());
        }
        Command::Add {
            template,
            title,
            parent,
            alias,
            published_on,
            folder,
        } => {
            let mut resource = Resource::new(template, title).with_alias(alias);
            resource.parent = parent;
            resource.is_folder = folder;
            if let Some(value) = published_on {
                let date = parse_date_value(&value)
                    .ok_or_else(|| anyhow!("unrecognized date `{value}`"))?;
                resource.published = true;
                resource.published_on = Some(date.and_utc().timestamp());
            }
            store.create_resource(&resource)?;
            println!("{}", resource.id);
        }
        Command::Place { config, id } => {
            let props = AutofolderProperties::load(&config)?;
            let config = AutofolderConfig::from_properties(&props)?;
            let service = AutofolderService::new(store, config)?;
            match service.handle_save_by_id(id)? {
                SaveOutcome::Skipped(reason) => println!("skipped: {reason:?}"),
                SaveOutcome::Placed(placement) => println!(
                    "placed under {} (menu index {}, {} folder(s) created)",
                    placement.folder_id,
                    placement.menu_index,
                    placement.created.len()
                ),
            }
        }
        Command::Tree { root } => {
            let Some(resource) = store.get_resource(root)? else {
                bail!("resource not found: {root}");
            };
            print_tree(&store, &resource, 0)?;
        }
    }
    Ok(())
}

fn print_tree(store: &SqliteResourceStore<'_>, resource: &Resource, depth: usize) -> Result<()> {
    println!(
        "{}{} [{}] #{} {}",
        "  ".repeat(depth),
        resource.page_title,
        resource.alias,
        resource.menu_index,
        resource.id
    );
    for child in store.list_children(resource.id)? {
        print_tree(store, &child, depth + 1)?;
    }
    Ok(())
}
