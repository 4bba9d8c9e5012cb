//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Period lengths for focus, short break and long break
//! - Tick cadence
//! - Completion notifications
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::timer::{Cadence, TimerSettings};

/// Clock configuration. The auto-continue delay is fixed and not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Wall-clock length of one countdown second.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Start the next period on its own after a natural completion.
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_start: true,
            timer: TimerSettings::default(),
            clock: ClockConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        key.split('.').try_fold(root, |current, part| current.get(part))
    }

    /// Replace the leaf at `key`, parsing `value` as the type already there.
    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Path of `config.toml` in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory is unusable.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed or is
    /// invalid, or if the default config cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if no file exists.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check every value the rest of the system relies on.
    ///
    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.timer.validate()?;
        if self.clock.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "clock.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value does not parse as the
    /// key's type, or the result fails validation. `self` is unchanged on
    /// error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    /// See [`Config::apply`]; also fails if the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Tick cadence for the clock collaborators.
    pub fn cadence(&self) -> Cadence {
        Cadence {
            tick_interval: Duration::from_millis(self.clock.tick_interval_ms.max(1)),
            ..Cadence::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\nfocus_minutes = 50\n").unwrap();
        assert_eq!(parsed.timer.focus_minutes, 50);
        assert_eq!(parsed.timer.short_break_minutes, 5);
        assert_eq!(parsed.clock.tick_interval_ms, 1000);
        assert!(parsed.auto_start);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("auto_start").as_deref(), Some("true"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("timer.long_break_minutes", "20").unwrap();
        assert_eq!(cfg.timer.long_break_minutes, 20);
    }

    #[test]
    fn apply_updates_top_level_bool() {
        let mut cfg = Config::default();
        cfg.apply("auto_start", "false").unwrap();
        assert!(!cfg.auto_start);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.nonexistent", "1").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("notifications.enabled", "maybe").is_err());
        assert!(cfg.apply("timer.focus_minutes", "-3").is_err());
    }

    #[test]
    fn apply_rejects_out_of_range_and_keeps_old_value() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.focus_minutes", "0").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(cfg.timer.focus_minutes, 25);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_garbage_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [[[").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn cadence_from_clock_section() {
        let mut cfg = Config::default();
        cfg.clock.tick_interval_ms = 250;
        let cadence = cfg.cadence();
        assert_eq!(cadence.tick_interval, Duration::from_millis(250));
        assert_eq!(cadence.auto_continue_delay, Cadence::default().auto_continue_delay);
    }
}
