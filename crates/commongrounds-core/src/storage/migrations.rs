//! Database schema migrations.
//!
//! Each step runs once, in its own transaction, and bumps the version
//! recorded in `schema_version`. Steps are never edited after release; a
//! schema change is a new step.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Ordered migration steps. Step `i` brings the schema to version `i + 1`.
const STEPS: &[(&str, &str)] = &[
    (
        "session history and key-value tables",
        "CREATE TABLE IF NOT EXISTS focus_sessions (
            id                TEXT PRIMARY KEY,
            timestamp         TEXT NOT NULL,
            mode              TEXT NOT NULL,
            duration_minutes  INTEGER NOT NULL,
            completed_minutes INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    ),
    (
        "index for newest-first listing",
        "CREATE INDEX IF NOT EXISTS idx_focus_sessions_timestamp
            ON focus_sessions(timestamp);",
    ),
];

/// Schema version after all migrations have run.
pub const CURRENT_VERSION: i32 = STEPS.len() as i32;

/// Bring the database up to [`CURRENT_VERSION`].
///
/// # Errors
/// Returns an error if any step fails; earlier steps stay committed.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);")?;

    let from = get_schema_version(conn);
    for (version, (name, sql)) in (1..).zip(STEPS) {
        if version <= from {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        debug!(version, name, "schema migrated");
    }
    Ok(())
}

/// Version recorded in `schema_version`, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap_or_else(|e| {
            if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
                warn!(error = %e, "failed to read schema_version");
            }
            0
        })
}
