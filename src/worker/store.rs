//! SQLite-backed cache storage with named partitions
//!
//! Each partition maps request URLs to stored responses. Partitions exist
//! independently of their entries, so an empty partition still shows up in
//! [`CacheStore::keys`].

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::client::Response;
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "DAYBOOK_CACHE_DIR";

/// Meta key holding the version of the last activated worker
const ACTIVE_VERSION_KEY: &str = "active_version";

type Result<T> = std::result::Result<T, CacheError>;

/// Deterministic key for one entry of one partition
pub fn entry_key(partition: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(partition.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Persistent partitioned response cache
pub struct CacheStore {
    conn: Connection,
    path: PathBuf,
}

impl CacheStore {
    /// Open or create the store at the default cache location
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::cache_dir()?)
    }

    /// Get the cache directory path (~/.cache/daybook on Linux, or
    /// `DAYBOOK_CACHE_DIR` when set)
    pub fn cache_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("daybook"))
    }

    /// Open the store in a specific directory
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join("offline.db");
        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS partitions (
                name TEXT PRIMARY KEY NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                entry_key TEXT PRIMARY KEY NOT NULL,
                partition TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT,
                body BLOB NOT NULL,
                stored_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_partition ON entries(partition);
            CREATE INDEX IF NOT EXISTS idx_entries_url ON entries(url);

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn,
            path: db_path,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a partition if it does not exist yet
    pub fn open_partition(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    pub fn has_partition(&self, name: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM partitions WHERE name = ?1", [name], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Partition names in creation order
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM partitions ORDER BY created_at, rowid")?;
        let names = stmt
            .query_map([], |r| r.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Delete a partition and everything in it. Returns false if it did not exist.
    pub fn delete_partition(&self, name: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM entries WHERE partition = ?1", [name])?;
        let deleted = tx.execute("DELETE FROM partitions WHERE name = ?1", [name])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Store a response under its URL, replacing any previous entry
    pub fn put(&self, partition: &str, response: &Response) -> Result<()> {
        self.open_partition(partition)?;
        Self::insert(&self.conn, partition, response)
    }

    /// Store every response or none of them
    pub fn put_all(&self, partition: &str, responses: &[Response]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
            params![partition, Utc::now().timestamp()],
        )?;
        for response in responses {
            Self::insert(&tx, partition, response)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(conn: &Connection, partition: &str, response: &Response) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO entries
             (entry_key, partition, url, status, content_type, body, stored_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry_key(partition, &response.url),
                partition,
                response.url,
                response.status,
                response.content_type,
                response.body,
                Utc::now().timestamp(),
                response.body.len()
            ],
        )?;
        Ok(())
    }

    /// Stored response for `url` in one partition
    pub fn match_url(&self, partition: &str, url: &str) -> Result<Option<Response>> {
        let response = self
            .conn
            .query_row(
                "SELECT url, status, content_type, body FROM entries WHERE entry_key = ?1",
                [entry_key(partition, url)],
                Self::row_to_response,
            )
            .optional()?;
        Ok(response)
    }

    /// Stored response for `url` in the oldest partition that has one
    pub fn match_any(&self, url: &str) -> Result<Option<Response>> {
        let response = self
            .conn
            .query_row(
                "SELECT e.url, e.status, e.content_type, e.body
                 FROM entries e JOIN partitions p ON p.name = e.partition
                 WHERE e.url = ?1
                 ORDER BY p.created_at, p.rowid
                 LIMIT 1",
                [url],
                Self::row_to_response,
            )
            .optional()?;
        Ok(response)
    }

    fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<Response> {
        Ok(Response {
            url: row.get(0)?,
            status: row.get(1)?,
            content_type: row.get(2)?,
            body: row.get(3)?,
        })
    }

    /// Entries of one partition, ordered by URL
    pub fn entries(&self, partition: &str) -> Result<Vec<EntryInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, status, size_bytes, stored_at FROM entries
             WHERE partition = ?1 ORDER BY url",
        )?;
        let entries = stmt
            .query_map([partition], |r| {
                Ok(EntryInfo {
                    url: r.get(0)?,
                    status: r.get(1)?,
                    size_bytes: r.get::<_, i64>(2)? as usize,
                    stored_at: timestamp(r.get(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Version of the last worker that activated against this store
    pub fn active_version(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [ACTIVE_VERSION_KEY],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_active_version(&self, version: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![ACTIVE_VERSION_KEY, version],
        )?;
        Ok(())
    }

    /// Remove every partition and entry
    pub fn clear_all(&self) -> Result<ClearStats> {
        let entries: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))?;
        let partitions: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM partitions", [], |r| r.get(0))?;

        self.conn
            .execute_batch("DELETE FROM entries; DELETE FROM partitions; DELETE FROM meta;")?;

        Ok(ClearStats {
            entries_removed: entries as usize,
            partitions_removed: partitions as usize,
        })
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, COUNT(e.entry_key), COALESCE(SUM(e.size_bytes), 0)
             FROM partitions p LEFT JOIN entries e ON e.partition = p.name
             GROUP BY p.name
             ORDER BY p.created_at, p.rowid",
        )?;
        let partitions = stmt
            .query_map([], |r| {
                Ok(PartitionStats {
                    name: r.get(0)?,
                    entries: r.get::<_, i64>(1)? as usize,
                    size_bytes: r.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let (oldest, newest): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(stored_at), MAX(stored_at) FROM entries",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        Ok(CacheStats {
            total_entries: partitions.iter().map(|p| p.entries).sum(),
            total_size_bytes: partitions.iter().map(|p| p.size_bytes).sum(),
            partitions,
            oldest_entry: oldest.map(timestamp),
            newest_entry: newest.map(timestamp),
        })
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Summary of one stored entry
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub url: String,
    pub status: u16,
    pub size_bytes: usize,
    pub stored_at: DateTime<Utc>,
}

/// Statistics about cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
    pub partitions_removed: usize,
}

#[derive(Debug, Clone)]
pub struct PartitionStats {
    pub name: String,
    pub entries: usize,
    pub size_bytes: usize,
}

/// Statistics about cache state
#[derive(Debug)]
pub struct CacheStats {
    pub partitions: Vec<PartitionStats>,
    pub total_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}
