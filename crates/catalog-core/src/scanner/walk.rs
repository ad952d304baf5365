use crate::summary::FileStat;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

/// A regular file found under a root, with its metadata when it could be read.
#[derive(Debug)]
pub struct WalkedFile {
    pub path: PathBuf,
    pub stat: Option<FileStat>,
}

/// Walks `root` depth-first and calls `visit` for every regular, non-hidden
/// file. Hidden directories are not descended into and entries matching an
/// ignore pattern are pruned. Unreadable directories are logged and skipped.
pub fn walk_files<F>(root: &Path, ignore_globs: &[String], mut visit: F)
where
    F: FnMut(WalkedFile),
{
    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry, &ignore_patterns));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                match err.path() {
                    Some(path) => warn!("Failed to stat {}: {}", path.display(), err),
                    None => warn!("Walk error under {}: {}", root.display(), err),
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let stat = match entry.metadata() {
            Ok(metadata) => match FileStat::try_from(&metadata) {
                Ok(stat) => Some(stat),
                Err(err) => {
                    warn!("No modification time for {}: {}", entry.path().display(), err);
                    None
                }
            },
            Err(err) => {
                warn!("Failed to stat {}: {}", entry.path().display(), err);
                None
            }
        };

        visit(WalkedFile {
            path: entry.into_path(),
            stat,
        });
    }
}

fn is_pruned(entry: &DirEntry, ignore_patterns: &[Pattern]) -> bool {
    is_hidden(entry)
        || ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(entry.path()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
