use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "catalog")]
#[command(about = "Catalog the files of a disk and find them again", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarize every file under the given roots into the catalog
    Scan {
        /// Label identifying the disk or collection being scanned
        #[arg(long)]
        tag: String,
        /// Catalog database file
        #[arg(long)]
        db: PathBuf,
        /// Prefix removed from stored paths, usually the mount point
        #[arg(long)]
        strip_prefix: Option<PathBuf>,
        /// Thumbnail width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Keep thumbnails in a database next to the catalog
        #[arg(long)]
        thumbnails: bool,
        /// Skip PDF page extraction
        #[arg(long)]
        no_documents: bool,
        #[arg(required = true)]
        roots: Vec<PathBuf>,
    },
    /// Fuzzy search the cataloged paths
    Search {
        /// Catalog database file
        #[arg(long)]
        db: PathBuf,
        query: String,
    },
    /// Print the catalog schema
    Schema {
        /// Include the thumbnails table
        #[arg(long)]
        thumbnails: bool,
    },
    /// Print configuration values
    PrintConfig,
}
