use crate::config::{self, CatalogConfig};
use crate::error::Error;
use crate::inspect::ContentInspector;
use crate::matcher::PathMatcher;
use crate::progress::ProgressReporter;
use crate::scanner;
use crate::storage::{Database, TaggedPath};
use crate::summary::FileStat;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives a catalog run: walk every root, summarize each file and save it.
pub struct CatalogEngine<'db> {
    config: CatalogConfig,
    inspector: ContentInspector,
    db: &'db Database,
}

/// Counters for one catalog run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub files_seen: usize,
    pub saved: usize,
    /// Files already cataloged with the same tag, path and content.
    pub duplicates: usize,
    pub save_errors: usize,
    /// Saved summaries that carry a failure classification.
    pub with_failures: usize,
}

impl<'db> CatalogEngine<'db> {
    pub fn new(config: CatalogConfig, db: &'db Database) -> Self {
        let inspector = ContentInspector::new(&config);
        Self {
            config,
            inspector,
            db,
        }
    }

    /// Catalog every file under `roots` with `tag`.
    ///
    /// Per-file problems never abort the run: failed stages are recorded on
    /// the summary, duplicates are counted, and other save errors are logged.
    pub fn catalog(
        &self,
        tag: &str,
        roots: &[PathBuf],
        reporter: &dyn ProgressReporter,
    ) -> Result<CatalogStats, Error> {
        let start = Instant::now();
        reporter.on_catalog_start();

        let absolute: Vec<PathBuf> = roots
            .iter()
            .filter_map(|root| match std::path::absolute(root) {
                Ok(path) => Some(path),
                Err(err) => {
                    error!("Cannot resolve root {}: {}", root.display(), err);
                    None
                }
            })
            .collect();
        let roots = config::non_overlapping_roots(absolute);
        info!("Cataloging {:?} as '{}'", roots, tag);

        let mut stats = CatalogStats::default();
        for root in &roots {
            reporter.on_root_start(root);
            scanner::walk_files(root, &self.config.ignore_patterns, |file| {
                stats.files_seen += 1;
                self.catalog_file(tag, &file.path, file.stat, &mut stats);
                reporter.on_file_cataloged(stats.files_seen, &file.path);
            });
        }

        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "Cataloged {} files in {:.2}s: {} saved, {} duplicates, {} save errors",
            stats.files_seen, elapsed, stats.saved, stats.duplicates, stats.save_errors,
        );
        reporter.on_catalog_complete(&stats, elapsed);
        Ok(stats)
    }

    fn catalog_file(
        &self,
        tag: &str,
        path: &Path,
        stat: Option<FileStat>,
        stats: &mut CatalogStats,
    ) {
        let summary = self.inspector.inspect(tag, path, stat);
        if let Some(failure) = &summary.failure {
            debug!("{}: {}", path.display(), failure);
        }

        match self.db.save_summary(&summary) {
            Ok(()) => {
                stats.saved += 1;
                if summary.failure.is_some() {
                    stats.with_failures += 1;
                }
            }
            Err(err) if err.is_duplicate() => {
                debug!("{}", err);
                stats.duplicates += 1;
            }
            Err(err) => {
                warn!("Failed to save {}: {}", path.display(), err);
                stats.save_errors += 1;
            }
        }
    }

    /// Fuzzy search over every cataloged path, best match first.
    pub fn search(&self, query: &str) -> Result<Vec<TaggedPath>, Error> {
        search(self.db, query)
    }
}

/// Fuzzy search over every cataloged path in `db`, best match first.
pub fn search(db: &Database, query: &str) -> Result<Vec<TaggedPath>, Error> {
    let candidates = db.scan_paths()?;
    let matches = PathMatcher::find(query, &candidates);
    debug!(
        "'{}' matched {} of {} paths",
        query,
        matches.len(),
        candidates.len()
    );
    Ok(matches
        .into_iter()
        .map(|m| m.candidate.clone())
        .collect())
}
