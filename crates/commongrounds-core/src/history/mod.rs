//! Session history: the append-only log of finished or saved periods.
//!
//! The engine writes to history through the [`SessionHistory`] trait so any
//! backend can sit behind it. [`MemoryHistory`] keeps records in process;
//! the SQLite [`Database`](crate::storage::Database) persists them.

mod memory;
mod stats;

pub use memory::MemoryHistory;
pub use stats::HistoryStats;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::timer::TimerMode;

/// Identifier assigned by the store on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What the engine hands to the store. The store adds id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub mode: TimerMode,
    pub duration_minutes: u32,
    pub completed_minutes: u32,
}

impl SessionDraft {
    /// Seal the draft into an immutable record stamped now.
    pub fn into_session(self) -> FocusSession {
        self.into_session_at(SessionId::new(), Utc::now())
    }

    pub fn into_session_at(self, id: SessionId, timestamp: DateTime<Utc>) -> FocusSession {
        FocusSession {
            id,
            timestamp,
            mode: self.mode,
            duration_minutes: self.duration_minutes,
            completed_minutes: self.completed_minutes.min(self.duration_minutes),
        }
    }
}

/// A recorded period. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub mode: TimerMode,
    pub duration_minutes: u32,
    pub completed_minutes: u32,
}

impl FocusSession {
    /// True when the whole configured period was completed.
    pub fn is_complete(&self) -> bool {
        self.completed_minutes >= self.duration_minutes
    }

    pub fn timestamp_local(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }
}

/// Append-only store of [`FocusSession`] records.
///
/// Reads fail soft: a store that cannot read or decode its data returns an
/// empty list rather than an error.
pub trait SessionHistory {
    /// Record a session and return its id.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the record.
    fn append(&mut self, draft: SessionDraft) -> Result<SessionId>;

    /// All sessions, newest first.
    fn list_all(&self) -> Vec<FocusSession>;

    /// Delete every record.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be cleared.
    fn clear_all(&mut self) -> Result<()>;

    /// The newest `limit` sessions.
    fn recent(&self, limit: usize) -> Vec<FocusSession> {
        let mut all = self.list_all();
        all.truncate(limit);
        all
    }
}

impl<H: SessionHistory + ?Sized> SessionHistory for &mut H {
    fn append(&mut self, draft: SessionDraft) -> Result<SessionId> {
        (**self).append(draft)
    }

    fn list_all(&self) -> Vec<FocusSession> {
        (**self).list_all()
    }

    fn clear_all(&mut self) -> Result<()> {
        (**self).clear_all()
    }
}

impl<H: SessionHistory + ?Sized> SessionHistory for Box<H> {
    fn append(&mut self, draft: SessionDraft) -> Result<SessionId> {
        (**self).append(draft)
    }

    fn list_all(&self) -> Vec<FocusSession> {
        (**self).list_all()
    }

    fn clear_all(&mut self) -> Result<()> {
        (**self).clear_all()
    }
}
