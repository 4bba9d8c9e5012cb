//! Core error types for commongrounds-core.
//!
//! Engine operations never fail; these errors come from the storage,
//! configuration and validation edges of the library.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for commongrounds-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine state or config could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the SQLite session store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to open session history at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed or a stored row could not be decoded.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Session history migration failed: {0}")]
    MigrationFailed(String),

    /// Another connection holds the lock, typically a second
    /// `commongrounds` process.
    #[error("Session history is busy; is another commongrounds running?")]
    Busy,
}

/// Failures reading, editing or writing `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Cannot determine data directory: {0}")]
    NoDataDir(String),
}

/// A user-supplied value the timer cannot accept.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value for '{field}': {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _)
                if matches!(
                    inner.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                DatabaseError::Busy
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
