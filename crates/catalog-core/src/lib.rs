pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod inspect;
pub mod matcher;
pub mod progress;
pub mod scanner;
pub mod storage;
pub mod summary;

pub use config::CatalogConfig;
pub use engine::{CatalogEngine, CatalogStats};
pub use error::Error;
pub use inspect::ContentInspector;
pub use matcher::{PathMatch, PathMatcher};
pub use progress::{ProgressReporter, SilentReporter};
pub use storage::{Database, TaggedPath};
pub use summary::{Failure, FileStat, FileSummary};
