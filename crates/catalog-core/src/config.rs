use crate::error::Error;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 640;

/// Settings threaded through the inspector, walker and engine for one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Target width of image thumbnails. Aspect ratio is preserved.
    pub thumbnail_width: u32,
    /// Prefix stripped from cataloged paths, usually the mount point of a disk.
    pub strip_prefix: Option<PathBuf>,
    /// Enables the document extractor.
    pub documents: bool,
    /// Persists thumbnails into the attached thumbnails database.
    pub store_thumbnails: bool,
    pub ignore_patterns: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            strip_prefix: None,
            documents: true,
            store_thumbnails: false,
            ignore_patterns: Vec::new(),
        }
    }
}

/// Loads `Catalog.{toml,yaml,json,...}` from the working directory if present,
/// then overlays `CATALOG_*` environment variables.
pub fn load_configuration() -> Result<CatalogConfig, Error> {
    load_configuration_from(Path::new("Catalog"))
}

/// Like [`load_configuration`], with the settings file named by `base`
/// (without extension).
pub fn load_configuration_from(base: &Path) -> Result<CatalogConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(&base.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("CATALOG").try_parsing(true))
        .build()?;
    Ok(builder.try_deserialize::<CatalogConfig>()?)
}

/// Remove roots that live inside another root of the list, keeping the first
/// occurrence order of the survivors.
pub fn non_overlapping_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for root in roots {
        if result.iter().any(|kept| is_within(&root, kept)) {
            continue;
        }
        result.retain(|kept| !is_within(kept, &root));
        result.push(root);
    }

    result
}

fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.thumbnail_width, 640);
        assert!(config.documents);
        assert!(!config.store_thumbnails);
        assert!(config.strip_prefix.is_none());
    }

    #[test]
    fn test_settings_file_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("Catalog.toml"),
            "thumbnail_width = 320\ndocuments = false\n",
        )
        .unwrap();

        let config = load_configuration_from(&tmp.path().join("Catalog")).unwrap();
        assert_eq!(config.thumbnail_width, 320);
        assert!(!config.documents);
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_configuration_from(&tmp.path().join("Catalog")).unwrap();
        assert_eq!(config.thumbnail_width, DEFAULT_THUMBNAIL_WIDTH);
    }

    #[test]
    fn test_invalid_settings_are_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Catalog.toml"), "thumbnail_width = \"wide\"\n").unwrap();

        let err = load_configuration_from(&tmp.path().join("Catalog")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_non_overlapping_no_overlap() {
        let roots = vec![
            PathBuf::from("/mnt/a/photos"),
            PathBuf::from("/mnt/a/docs"),
            PathBuf::from("/var/data"),
        ];
        let result = non_overlapping_roots(roots);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_non_overlapping_drops_nested_roots() {
        let roots = vec![
            PathBuf::from("/mnt/a/docs"),
            PathBuf::from("/mnt/a"),
            PathBuf::from("/mnt/a/photos"),
            PathBuf::from("/var/data"),
        ];
        let result = non_overlapping_roots(roots);
        assert_eq!(
            result,
            vec![PathBuf::from("/mnt/a"), PathBuf::from("/var/data")]
        );
    }

    #[test]
    fn test_sibling_with_common_string_prefix_is_kept() {
        let roots = vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/ab")];
        assert_eq!(non_overlapping_roots(roots).len(), 2);
    }
}
