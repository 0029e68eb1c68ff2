//! SQLite connection management for the note store file.

use crate::{Result, StackmateError};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Schema version written to `store_meta` on creation.
pub const SCHEMA_VERSION: i64 = 1;

/// How long a write waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Creates (or re-initialises) the schema at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.execute(
            "INSERT OR IGNORE INTO store_meta (key, value) VALUES ('schema_version', ?)",
            [SCHEMA_VERSION.to_string()],
        )?;
        Ok(Self { conn })
    }

    /// Opens an existing store, rejecting files that are not StackMate stores.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('notes', 'store_meta')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 2 {
            return Err(StackmateError::InvalidStore(
                "Not a valid StackMate notes database".to_string(),
            ));
        }

        let version: i64 = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )?
            .parse()
            .map_err(|_| StackmateError::InvalidStore("Unreadable schema version".to_string()))?;

        if version > SCHEMA_VERSION {
            return Err(StackmateError::InvalidStore(format!(
                "Store schema version {version} is newer than this build supports"
            )));
        }

        Ok(Self { conn })
    }

    /// Opens `path` if it holds data, otherwise creates a fresh store there.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let has_data = std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        if has_data {
            Self::open(path)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Self::create(path)
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
