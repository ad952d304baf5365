use chrono::{DateTime, NaiveDateTime, Utc};
use std::ffi::OsStr;
use std::fs::Metadata;
use std::io;
use std::path::{Component, Path};
use thiserror::Error;

/// Why a stage of the summarization pipeline could not complete.
///
/// These are recorded on the summary and persisted as text; they never abort
/// the pipeline or the run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    #[error("cannot stat file")]
    Stat,
    #[error("cannot open file")]
    Open,
    #[error("cannot read file")]
    Read,
    #[error("cannot seek file")]
    Seek,
    #[error("cannot decode image metadata")]
    Metadata,
    #[error("image metadata has no usable capture time")]
    Timestamp,
    #[error("cannot decode image")]
    Decode,
    #[error("cannot encode thumbnail")]
    Encode,
    #[error("cannot build document thumbnail")]
    Document,
}

/// File-system facts gathered by the walker before the file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub mod_time: DateTime<Utc>,
}

impl TryFrom<&Metadata> for FileStat {
    type Error = io::Error;

    fn try_from(metadata: &Metadata) -> Result<Self, Self::Error> {
        Ok(Self {
            size: metadata.len(),
            mod_time: metadata.modified()?.into(),
        })
    }
}

/// Everything the catalog learns about one file.
///
/// Built once by [`crate::ContentInspector`] and handed to the store as is.
/// Fields the pipeline could not determine are `None`, never zero or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub tag: String,
    pub path: String,
    pub content_hash: Option<String>,
    pub size: Option<u64>,
    pub mod_time: Option<DateTime<Utc>>,
    pub media_type: Option<String>,
    pub capture_time: Option<NaiveDateTime>,
    pub thumbnail: Option<Vec<u8>>,
    pub failure: Option<Failure>,
}

impl FileSummary {
    pub(crate) fn new(tag: &str, path: String) -> Self {
        Self {
            tag: tag.to_string(),
            path,
            content_hash: None,
            size: None,
            mod_time: None,
            media_type: None,
            capture_time: None,
            thumbnail: None,
            failure: None,
        }
    }

    pub fn error_text(&self) -> Option<String> {
        self.failure.map(|f| f.to_string())
    }
}

/// Path as stored in the catalog: relative to `strip_prefix` when it applies,
/// with components joined by `/`.
///
/// Bytes that are not valid UTF-8 are written as `%XX`, and so is `%` itself,
/// so distinct file names never collapse into the same stored path.
pub fn normalize_path(path: &Path, strip_prefix: Option<&Path>) -> String {
    let relative = match strip_prefix {
        Some(prefix) => match path.strip_prefix(prefix) {
            Ok(rel) => rel,
            Err(_) => {
                tracing::warn!(
                    "path {}: not under {}, stored unchanged",
                    path.display(),
                    prefix.display()
                );
                path
            }
        },
        None => path,
    };

    let mut out = String::new();
    for component in relative.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => push_escaped(&mut out, prefix.as_os_str()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                push_escaped(&mut out, other.as_os_str());
            }
        }
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}

fn push_escaped(out: &mut String, name: &OsStr) {
    for chunk in name.as_encoded_bytes().utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '%' => out.push_str("%25"),
                c => out.push(c),
            }
        }
        for byte in chunk.invalid() {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_without_prefix_keeps_absolute_path() {
        let path = Path::new("/mnt/c/snapshot/a.txt");
        assert_eq!(normalize_path(path, None), "/mnt/c/snapshot/a.txt");
    }

    #[test]
    fn test_normalize_strips_volume_prefix() {
        let path = Path::new("/mnt/c/snapshot/photos/a.jpg");
        assert_eq!(
            normalize_path(path, Some(Path::new("/mnt/c"))),
            "snapshot/photos/a.jpg"
        );
    }

    #[test]
    fn test_normalize_outside_prefix_is_unchanged() {
        let path = Path::new("/srv/other/a.jpg");
        assert_eq!(
            normalize_path(path, Some(Path::new("/mnt/c"))),
            "/srv/other/a.jpg"
        );
    }

    #[test]
    fn test_normalize_escapes_percent() {
        let path = Path::new("docs/100%25 done.txt");
        assert_eq!(normalize_path(path, None), "docs/100%2525 done.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_keeps_invalid_utf8_names_apart() {
        use std::os::unix::ffi::OsStrExt;

        let ff = Path::new(OsStr::from_bytes(b"photos/a\xff.txt"));
        let fe = Path::new(OsStr::from_bytes(b"photos/a\xfe.txt"));
        assert_eq!(normalize_path(ff, None), "photos/a%FF.txt");
        assert_eq!(normalize_path(fe, None), "photos/a%FE.txt");
    }

    #[test]
    fn test_failure_text_is_human_readable() {
        let mut summary = FileSummary::new("t1", "a.jpg".to_string());
        assert_eq!(summary.error_text(), None);
        summary.failure = Some(Failure::Decode);
        assert_eq!(summary.error_text().as_deref(), Some("cannot decode image"));
    }
}
