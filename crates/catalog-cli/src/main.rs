mod commands;
mod logging;
mod progress;

use anyhow::{bail, Context, Result};
use catalog_core::storage::{schema_sql, Database};
use catalog_core::{CatalogConfig, CatalogEngine};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = catalog_core::config::load_configuration()
        .context("Error loading configuration")?;

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan {
            tag,
            db,
            strip_prefix,
            width,
            thumbnails,
            no_documents,
            roots,
        }) => {
            let mut config = config;
            if let Some(prefix) = strip_prefix {
                config.strip_prefix = Some(prefix);
            }
            if let Some(width) = width {
                config.thumbnail_width = width;
            }
            config.store_thumbnails |= thumbnails;
            if no_documents {
                config.documents = false;
            }
            run_scan(config, &tag, &db, &roots)?;
        }
        Some(Commands::Search { db, query }) => run_search(&db, &query)?,
        Some(Commands::Schema { thumbnails }) => {
            print!("{}", schema_sql(thumbnails));
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_scan(config: CatalogConfig, tag: &str, db_path: &Path, roots: &[PathBuf]) -> Result<()> {
    if tag.is_empty() {
        bail!("--tag must not be empty");
    }
    if config.thumbnail_width == 0 {
        bail!("--width must be at least 1");
    }

    let db = if config.store_thumbnails {
        Database::open_with_thumbnails(db_path)
    } else {
        Database::open(db_path)
    }
    .with_context(|| format!("Cannot open catalog {}", db_path.display()))?;

    let engine = CatalogEngine::new(config, &db);
    let reporter = CliReporter::new();
    let stats = engine.catalog(tag, roots, &reporter)?;

    info!(
        "{} files seen, {} saved, {} already cataloged",
        format!("{}", stats.files_seen).cyan(),
        format!("{}", stats.saved).green(),
        format!("{}", stats.duplicates).yellow(),
    );
    if stats.with_failures > 0 || stats.save_errors > 0 {
        info!(
            "{} saved with failures, {} could not be saved",
            format!("{}", stats.with_failures).red(),
            format!("{}", stats.save_errors).red(),
        );
    }

    Ok(())
}

fn run_search(db_path: &Path, query: &str) -> Result<()> {
    if query.is_empty() {
        bail!("search query must not be empty");
    }
    if !db_path.exists() {
        bail!("No catalog at {}", db_path.display());
    }

    let db = Database::open(db_path)
        .with_context(|| format!("Cannot open catalog {}", db_path.display()))?;
    let found = catalog_core::engine::search(&db, query)?;
    info!("{} matches for '{}'", found.len(), query);

    for entry in found {
        println!("{} {}", entry.tag, entry.path);
    }

    Ok(())
}
