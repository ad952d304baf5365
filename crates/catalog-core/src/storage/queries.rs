use super::models::{FileRecord, TaggedPath};
use super::sqlite::Database;
use crate::error::Error;
use crate::summary::FileSummary;
use rusqlite::{ffi, params, OptionalExtension, Result};
use tracing::trace;

const INSERT_FILE_SQL: &str = "INSERT INTO files \
     (tag, path, content_hash, size, mod_time, media_type, capture_time, error) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const INSERT_THUMB_SQL: &str = "INSERT INTO thumbs.thumbnails (file_id, thumbnail) VALUES (?1, ?2)";

impl Database {
    // ── Summaries ────────────────────────────────────────────────

    /// Insert one summary, with its thumbnail when thumbnails are stored.
    ///
    /// The rows are written in a single transaction. A summary whose
    /// (tag, path, content hash) is already present fails with
    /// [`Error::Duplicate`] and leaves the store untouched.
    pub fn save_summary(&self, summary: &FileSummary) -> std::result::Result<(), Error> {
        let tx = self.connection().unchecked_transaction()?;
        let file_id = {
            let mut stmt = tx.prepare_cached(INSERT_FILE_SQL)?;
            let inserted = stmt.execute(params![
                summary.tag,
                summary.path,
                summary.content_hash,
                summary.size.map(|s| s as i64),
                summary.mod_time.map(|t| t.to_rfc3339()),
                summary.media_type,
                summary
                    .capture_time
                    .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
                summary.error_text(),
            ]);
            match inserted {
                Ok(_) => tx.last_insert_rowid(),
                Err(err) if is_unique_violation(&err) => {
                    return Err(Error::Duplicate {
                        tag: summary.tag.clone(),
                        path: summary.path.clone(),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        };

        if self.stores_thumbnails() {
            if let Some(thumbnail) = &summary.thumbnail {
                let mut stmt = tx.prepare_cached(INSERT_THUMB_SQL)?;
                stmt.execute(params![file_id, thumbnail])?;
            }
        }

        tx.commit()?;
        trace!("Saved {}:{} as file {}", summary.tag, summary.path, file_id);
        Ok(())
    }

    // ── Search ───────────────────────────────────────────────────

    /// Every cataloged (tag, path) pair, in whatever order SQLite returns them.
    pub fn scan_paths(&self) -> Result<Vec<TaggedPath>> {
        let mut stmt = self.connection().prepare_cached("SELECT tag, path FROM files")?;
        let paths = stmt
            .query_map([], |row| {
                Ok(TaggedPath {
                    tag: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(paths)
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn count_files(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
    }

    /// The most recently inserted row for (tag, path).
    pub fn get_file(&self, tag: &str, path: &str) -> Result<Option<FileRecord>> {
        self.connection()
            .query_row(
                "SELECT id, tag, path, content_hash, size, mod_time, media_type, \
                        capture_time, error \
                 FROM files WHERE tag = ?1 AND path = ?2 \
                 ORDER BY id DESC LIMIT 1",
                params![tag, path],
                |row| {
                    Ok(FileRecord {
                        id: row.get(0)?,
                        tag: row.get(1)?,
                        path: row.get(2)?,
                        content_hash: row.get(3)?,
                        size: row.get(4)?,
                        mod_time: row.get(5)?,
                        media_type: row.get(6)?,
                        capture_time: row.get(7)?,
                        error: row.get(8)?,
                    })
                },
            )
            .optional()
    }

    pub fn thumbnail_for(&self, file_id: i64) -> Result<Option<Vec<u8>>> {
        if !self.stores_thumbnails() {
            return Ok(None);
        }
        self.connection()
            .query_row(
                "SELECT thumbnail FROM thumbs.thumbnails WHERE file_id = ?1",
                params![file_id],
                |row| row.get(0),
            )
            .optional()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
