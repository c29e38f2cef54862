//! Session storage
//!
//! Persists session-scoped key-value slots (the transcript lives in one of
//! them) in SQLite.

mod snapshot;

pub use snapshot::{decode_transcript, encode_transcript, SnapshotError, SNAPSHOT_VERSION};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS session_slots (
    session_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    PRIMARY KEY (session_id, key)
);
";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct SessionDb {
    conn: Arc<Mutex<Connection>>,
}

impl SessionDb {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Read a slot; `None` if it was never written
    pub fn get_slot(&self, session_id: &str, key: &str) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM session_slots WHERE session_id = ?1 AND key = ?2",
                params![session_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write a slot, replacing any previous value
    pub fn set_slot(&self, session_id: &str, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO session_slots (session_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![session_id, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
