//! SQLite release store
//!
//! Holds one row per publish event. The generator only reads; `publish`
//! appends.

use std::path::Path;

use chrono::{DateTime, Utc};
use rtpub_schema::Release;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Release tag already exists: {0}")]
    DuplicateTag(String),

    #[error("Invalid timestamp {value:?} on release {tag}")]
    Timestamp { tag: String, value: String },

    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything the generator can take a release snapshot from.
pub trait ReleaseSource {
    /// All stored releases, oldest first.
    fn releases(&self) -> Result<Vec<Release>, StoreError>;
}

/// Anything `publish` can record a release into.
pub trait ReleaseSink {
    /// Whether a release with `tag` is already recorded.
    fn contains_tag(&self, tag: &str) -> Result<bool, StoreError>;

    /// Persist one release row.
    fn insert_release(&self, release: &Release) -> Result<(), StoreError>;
}

impl ReleaseSource for Vec<Release> {
    fn releases(&self) -> Result<Vec<Release>, StoreError> {
        Ok(self.clone())
    }
}

impl ReleaseSource for [Release] {
    fn releases(&self) -> Result<Vec<Release>, StoreError> {
        Ok(self.to_vec())
    }
}

/// Release database
#[derive(Debug)]
pub struct ReleaseDb {
    conn: Connection,
}

impl ReleaseDb {
    /// Open or create the release database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;

        // WAL so a running `generate` does not block `publish`
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS releases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                runtime TEXT NOT NULL,
                version TEXT NOT NULL,
                major INTEGER NOT NULL,
                minor INTEGER NOT NULL,
                patch INTEGER NOT NULL,
                tag TEXT NOT NULL UNIQUE,
                url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                artifacts TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_releases_runtime ON releases(runtime);
            ",
        )?;
        Ok(())
    }

    /// Record a release. Tags are unique.
    pub fn insert_release(&self, release: &Release) -> Result<(), StoreError> {
        let result = self.conn.execute(
            "INSERT INTO releases
                (runtime, version, major, minor, patch, tag, url, created_at, artifacts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                release.runtime,
                release.version,
                to_sql_int(release.major),
                to_sql_int(release.minor),
                to_sql_int(release.patch),
                release.tag,
                release.url,
                release.created_at.to_rfc3339(),
                release.artifacts,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicateTag(release.tag.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All releases in insertion order
    pub fn releases(&self) -> Result<Vec<Release>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT runtime, version, major, minor, patch, tag, url, created_at, artifacts
             FROM releases ORDER BY id",
        )?;

        let rows = stmt.query_map([], RawRelease::from_row)?;
        rows.map(|row| row?.into_release()).collect()
    }

    /// Get a release by tag
    pub fn get_by_tag(&self, tag: &str) -> Result<Option<Release>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT runtime, version, major, minor, patch, tag, url, created_at, artifacts
                 FROM releases WHERE tag = ?1",
                params![tag],
                RawRelease::from_row,
            )
            .optional()?;

        raw.map(RawRelease::into_release).transpose()
    }
}

impl ReleaseSource for ReleaseDb {
    fn releases(&self) -> Result<Vec<Release>, StoreError> {
        ReleaseDb::releases(self)
    }
}

impl ReleaseSink for ReleaseDb {
    fn contains_tag(&self, tag: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM releases WHERE tag = ?1", params![tag], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_release(&self, release: &Release) -> Result<(), StoreError> {
        ReleaseDb::insert_release(self, release)
    }
}

// SQLite integers are signed; versions never get near the limit.
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// A row as stored, before the timestamp is parsed.
struct RawRelease {
    runtime: String,
    version: String,
    major: i64,
    minor: i64,
    patch: i64,
    tag: String,
    url: String,
    created_at: String,
    artifacts: String,
}

impl RawRelease {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            runtime: row.get(0)?,
            version: row.get(1)?,
            major: row.get(2)?,
            minor: row.get(3)?,
            patch: row.get(4)?,
            tag: row.get(5)?,
            url: row.get(6)?,
            created_at: row.get(7)?,
            artifacts: row.get(8)?,
        })
    }

    fn into_release(self) -> Result<Release, StoreError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| StoreError::Timestamp {
                tag: self.tag.clone(),
                value: self.created_at.clone(),
            })?;

        Ok(Release {
            runtime: self.runtime,
            version: self.version,
            major: u64::try_from(self.major).unwrap_or_default(),
            minor: u64::try_from(self.minor).unwrap_or_default(),
            patch: u64::try_from(self.patch).unwrap_or_default(),
            tag: self.tag,
            url: self.url,
            created_at,
            artifacts: self.artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn release(tag: &str, version: &str) -> Release {
        Release {
            runtime: "nodejs".into(),
            version: version.into(),
            major: 22,
            minor: 15,
            patch: 0,
            tag: tag.into(),
            url: format!("https://example.com/releases/{tag}"),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            artifacts: r#"{"platforms":[],"common_files":[],"metadata":{"artifact_count":0,"total_size":0,"platform_count":0,"checksums_verified":false,"signatures_verified":false,"has_audits":false}}"#.into(),
        }
    }

    #[test]
    fn test_insert_and_list_in_order() {
        let dir = tempdir().unwrap();
        let db = ReleaseDb::open(&dir.path().join("releases.db")).unwrap();

        db.insert_release(&release("nodejs-22.15.0", "22.15.0")).unwrap();
        db.insert_release(&release("nodejs-20.0.0", "20.0.0")).unwrap();

        let rows = db.releases().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tag, "nodejs-22.15.0");
        assert_eq!(rows[1].tag, "nodejs-20.0.0");
        assert_eq!(rows[0], release("nodejs-22.15.0", "22.15.0"));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let db = ReleaseDb::open_in_memory().unwrap();
        db.insert_release(&release("t1", "1.0.0")).unwrap();

        let err = db.insert_release(&release("t1", "1.0.1")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTag(tag) if tag == "t1"));
    }

    #[test]
    fn test_get_by_tag() {
        let db = ReleaseDb::open_in_memory().unwrap();
        db.insert_release(&release("t1", "22.15.0, 22.14.0")).unwrap();

        let found = db.get_by_tag("t1").unwrap().unwrap();
        assert!(found.is_aggregated());
        assert!(db.contains_tag("t1").unwrap());
        assert!(!db.contains_tag("missing").unwrap());
        assert!(db.get_by_tag("missing").unwrap().is_none());
    }

    #[test]
    fn test_vec_is_a_source() {
        let rows = vec![release("a", "1.0.0")];
        assert_eq!(ReleaseSource::releases(&rows).unwrap().len(), 1);
    }
}
