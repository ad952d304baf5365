/// The search projection of a cataloged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedPath {
    pub tag: String,
    pub path: String,
}

/// A row of the `files` table as stored.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: i64,
    pub tag: String,
    pub path: String,
    pub content_hash: Option<String>,
    pub size: Option<i64>,
    pub mod_time: Option<String>,
    pub media_type: Option<String>,
    pub capture_time: Option<String>,
    pub error: Option<String>,
}
