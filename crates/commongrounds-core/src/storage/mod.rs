mod config;
pub mod database;
pub mod migrations;

pub use config::{ClockConfig, Config, NotificationsConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};

/// Returns the data directory, creating it if needed.
///
/// `COMMONGROUNDS_DATA_DIR` wins when set. Otherwise the directory is
/// `~/.config/commongrounds[-dev]/`, with `-dev` chosen by
/// `COMMONGROUNDS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("COMMONGROUNDS_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::NoDataDir("home directory not found".into()))?
                .join(".config");

            let env = std::env::var("COMMONGROUNDS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("commongrounds-dev")
            } else {
                base_dir.join("commongrounds")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
