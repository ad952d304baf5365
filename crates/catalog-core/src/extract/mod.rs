//! Type-specific extraction, selected by a capability-keyed table.

#[cfg(feature = "documents")]
pub mod document;
pub mod image;

use crate::config::CatalogConfig;
use crate::summary::Failure;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::io::{Read, Seek};

pub use self::image::ImageExtractor;
#[cfg(feature = "documents")]
pub use document::DocumentExtractor;

pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Where the stream came from, for extractors that stamp provenance.
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    pub tag: &'a str,
    pub path: &'a str,
}

/// Best-effort result of one extractor run. Any subset of the fields may be set.
#[derive(Debug, Default)]
pub struct Extraction {
    pub capture_time: Option<NaiveDateTime>,
    pub thumbnail: Option<Vec<u8>>,
    pub failure: Option<Failure>,
}

impl Extraction {
    pub fn failed(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }
}

pub trait Extractor: Send + Sync {
    /// The stream position is unspecified on entry; implementations rewind
    /// before reading.
    fn extract(&self, stream: &mut dyn ReadSeek, origin: &Origin<'_>) -> Extraction;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Image,
    Document,
}

impl Capability {
    pub fn for_media_type(media_type: &str) -> Option<Self> {
        if media_type.starts_with("image") {
            Some(Self::Image)
        } else if media_type.starts_with("application/pdf") {
            Some(Self::Document)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct Extractors {
    table: BTreeMap<Capability, Box<dyn Extractor>>,
}

impl Extractors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        let extractors =
            Self::empty().with(Capability::Image, ImageExtractor::new(config.thumbnail_width));

        #[cfg(feature = "documents")]
        let extractors = if config.documents {
            extractors.with(Capability::Document, DocumentExtractor)
        } else {
            extractors
        };

        extractors
    }

    pub fn with(mut self, capability: Capability, extractor: impl Extractor + 'static) -> Self {
        self.table.insert(capability, Box::new(extractor));
        self
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.table.contains_key(&capability)
    }

    /// Runs the extractor registered for `capability`; an unsupported
    /// capability yields an empty extraction rather than a failure.
    pub fn extract(
        &self,
        capability: Capability,
        stream: &mut dyn ReadSeek,
        origin: &Origin<'_>,
    ) -> Extraction {
        match self.table.get(&capability) {
            Some(extractor) => extractor.extract(stream, origin),
            None => Extraction::default(),
        }
    }
}
