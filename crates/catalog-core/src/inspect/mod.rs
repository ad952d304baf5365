mod hash;
pub mod sniff;

use crate::config::CatalogConfig;
use crate::extract::{Capability, Extractors, Origin};
use crate::summary::{normalize_path, Failure, FileStat, FileSummary};
use sniff::SNIFF_LEN;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Runs the summarization pipeline for single files:
/// stat → open → sniff → hash → type-specific extraction.
///
/// Every stage that fails is recorded on the returned summary and the
/// pipeline stops or carries on as far as the remaining information allows;
/// it never returns an error.
pub struct ContentInspector {
    strip_prefix: Option<PathBuf>,
    extractors: Extractors,
}

impl ContentInspector {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            strip_prefix: config.strip_prefix.as_deref().map(absolute_prefix),
            extractors: Extractors::from_config(config),
        }
    }

    pub fn with_extractors(mut self, extractors: Extractors) -> Self {
        self.extractors = extractors;
        self
    }

    /// Summarize the file at `path`. `stat` is `None` when the walker could
    /// not stat the entry.
    pub fn inspect(&self, tag: &str, path: &Path, stat: Option<FileStat>) -> FileSummary {
        let stored_path = normalize_path(path, self.strip_prefix.as_deref());

        let Some(stat) = stat else {
            debug!("{}: no file metadata", path.display());
            let mut summary = FileSummary::new(tag, stored_path);
            summary.failure = Some(Failure::Stat);
            return summary;
        };

        match File::open(path) {
            Ok(file) => self.inspect_stream(tag, stored_path, stat, file),
            Err(err) => {
                debug!("Cannot open {}: {}", path.display(), err);
                let mut summary = FileSummary::new(tag, stored_path);
                summary.size = Some(stat.size);
                summary.mod_time = Some(stat.mod_time);
                summary.failure = Some(Failure::Open);
                summary
            }
        }
    }

    /// Summarize an already opened stream. The stream is dropped (and a file
    /// closed) before this returns, whatever the outcome.
    pub fn inspect_stream<R: Read + Seek>(
        &self,
        tag: &str,
        path: String,
        stat: FileStat,
        mut stream: R,
    ) -> FileSummary {
        let mut summary = FileSummary::new(tag, path);
        summary.size = Some(stat.size);
        summary.mod_time = Some(stat.mod_time);

        let mut header = Vec::with_capacity(SNIFF_LEN);
        if let Err(err) = stream
            .by_ref()
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut header)
        {
            debug!("{}: cannot read header: {}", summary.path, err);
            summary.failure = Some(Failure::Read);
            return summary;
        }
        let media_type = sniff::detect_media_type(&header);
        summary.media_type = Some(media_type.to_string());

        match hash::content_hash(&mut stream) {
            Ok(content_hash) => summary.content_hash = Some(content_hash),
            Err(failure) => {
                debug!("{}: hashing stopped: {}", summary.path, failure);
                summary.failure = Some(failure);
                return summary;
            }
        }

        let Some(capability) = Capability::for_media_type(media_type) else {
            return summary;
        };

        let origin = Origin {
            tag,
            path: &summary.path,
        };
        let extraction = self.extractors.extract(capability, &mut stream, &origin);
        if let Some(failure) = extraction.failure {
            debug!("{}: {:?} extraction: {}", summary.path, capability, failure);
        }

        summary.capture_time = extraction.capture_time;
        summary.thumbnail = extraction.thumbnail;
        summary.failure = extraction.failure;
        summary
    }
}

/// Walked paths are absolute, so the prefix has to be as well.
fn absolute_prefix(prefix: &Path) -> PathBuf {
    std::path::absolute(prefix).unwrap_or_else(|err| {
        warn!("Cannot resolve strip prefix {}: {}", prefix.display(), err);
        prefix.to_path_buf()
    })
}
