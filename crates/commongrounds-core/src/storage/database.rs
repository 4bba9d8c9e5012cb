//! SQLite-backed session history and key-value state.
//!
//! Provides persistent storage for:
//! - Focus session history (the durable [`SessionHistory`] backend)
//! - Key-value store for application state such as the paused engine

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::warn;

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, Result};
use crate::history::{FocusSession, SessionDraft, SessionHistory, SessionId};
use crate::timer::TimerMode;

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "commongrounds.db";

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get the current schema version.
    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.conn)
    }

    /// Insert an already sealed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including on a duplicate id.
    pub fn insert_session(&self, session: &FocusSession) -> Result<()> {
        self.conn.execute(
            "INSERT INTO focus_sessions (id, timestamp, mode, duration_minutes, completed_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.id.to_string(),
                session.timestamp.to_rfc3339(),
                session.mode.as_str(),
                session.duration_minutes,
                session.completed_minutes,
            ],
        )?;
        Ok(())
    }

    /// Read every session, newest first, failing on the first undecodable row.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn load_sessions(&self) -> Result<Vec<FocusSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, mode, duration_minutes, completed_minutes
             FROM focus_sessions
             ORDER BY timestamp DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, timestamp, mode, duration_minutes, completed_minutes) = row?;
            let id: SessionId = id
                .parse()
                .map_err(|e| corrupt(format!("bad session id '{id}': {e}")))?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| corrupt(format!("bad timestamp '{timestamp}': {e}")))?;
            let mode = TimerMode::parse(&mode)
                .ok_or_else(|| corrupt(format!("bad mode '{mode}'")))?;
            sessions.push(FocusSession {
                id,
                timestamp,
                mode,
                duration_minutes,
                completed_minutes,
            });
        }
        Ok(sessions)
    }

    /// Get a value from the kv store.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Returns whether it existed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn kv_delete(&self, key: &str) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

fn corrupt(message: String) -> CoreError {
    DatabaseError::QueryFailed(message).into()
}

impl SessionHistory for Database {
    fn append(&mut self, draft: SessionDraft) -> Result<SessionId> {
        let session = draft.into_session();
        self.insert_session(&session)?;
        Ok(session.id)
    }

    fn list_all(&self) -> Vec<FocusSession> {
        self.load_sessions().unwrap_or_else(|e| {
            warn!(error = %e, "focus history unreadable, treating as empty");
            Vec::new()
        })
    }

    fn clear_all(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM focus_sessions", [])?;
        Ok(())
    }
}
