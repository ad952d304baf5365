use crate::engine::CatalogStats;
use std::path::Path;

/// Trait for reporting catalog progress.
///
/// The CLI implements it with an indicatif spinner. All methods have default
/// no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_catalog_start(&self) {}
    fn on_root_start(&self, _root: &Path) {}
    fn on_file_cataloged(&self, _files_seen: usize, _path: &Path) {}
    fn on_catalog_complete(&self, _stats: &CatalogStats, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
