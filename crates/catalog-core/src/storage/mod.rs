pub mod models;
pub mod queries;
pub mod sqlite;

pub use models::{FileRecord, TaggedPath};
pub use sqlite::{schema_sql, thumbnails_path, Database};
