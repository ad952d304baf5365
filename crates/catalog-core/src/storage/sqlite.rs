use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = include_str!("schema.sql");
const THUMBS_SCHEMA: &str = include_str!("thumbs.sql");
const SCHEMA_VERSION: i64 = 1;

/// The catalog store. Owns the SQLite connection for the lifetime of a run;
/// the connection is closed when the value is dropped.
pub struct Database {
    conn: Connection,
    thumbnails: bool,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn, None)
    }

    /// Opens the catalog and attaches `<stem>_thumbnails.<ext>` next to it
    /// for thumbnail storage.
    pub fn open_with_thumbnails(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::init(conn, Some(thumbnails_path(path)))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    pub fn open_in_memory_with_thumbnails() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, Some(PathBuf::from(":memory:")))
    }

    fn init(conn: Connection, thumbs: Option<PathBuf>) -> Result<Self> {
        let db = Database {
            conn,
            thumbnails: thumbs.is_some(),
        };
        db.configure_pragmas()?;
        if let Some(thumbs) = thumbs {
            db.conn.execute(
                "ATTACH DATABASE ?1 AS thumbs",
                params![thumbs.to_string_lossy()],
            )?;
            debug!("Attached thumbnails database {}", thumbs.display());
        }
        db.migrate_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode, 64MB cache)");
        Ok(())
    }

    fn migrate_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        self.conn.execute_batch(SCHEMA)?;
        if self.thumbnails {
            self.conn.execute_batch(THUMBS_SCHEMA)?;
        }

        if version < SCHEMA_VERSION {
            self.conn
                .execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
            debug!("Catalog schema initialized (version {})", SCHEMA_VERSION);
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn stores_thumbnails(&self) -> bool {
        self.thumbnails
    }
}

/// DDL of the catalog, as printed by the schema command.
pub fn schema_sql(with_thumbnails: bool) -> String {
    if with_thumbnails {
        format!("{SCHEMA}\n{THUMBS_SCHEMA}")
    } else {
        SCHEMA.to_string()
    }
}

/// `summaries.db` → `summaries_thumbnails.db`
pub fn thumbnails_path(db_path: &Path) -> PathBuf {
    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match db_path.extension() {
        Some(ext) => format!("{}_thumbnails.{}", stem, ext.to_string_lossy()),
        None => format!("{}_thumbnails", stem),
    };
    db_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnails_path() {
        assert_eq!(
            thumbnails_path(Path::new("/data/summaries.db")),
            PathBuf::from("/data/summaries_thumbnails.db")
        );
        assert_eq!(
            thumbnails_path(Path::new("catalog")),
            PathBuf::from("catalog_thumbnails")
        );
    }

    #[test]
    fn test_schema_sql_mentions_thumbnails_only_when_asked() {
        assert!(schema_sql(false).contains("CREATE TABLE IF NOT EXISTS files"));
        assert!(!schema_sql(false).contains("thumbnails"));
        assert!(schema_sql(true).contains("thumbs.thumbnails"));
    }

    #[test]
    fn test_schema_version_is_recorded() {
        let db = Database::open_in_memory().unwrap();
        let version: i64 = db
            .connection()
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert!(!db.stores_thumbnails());
    }
}
