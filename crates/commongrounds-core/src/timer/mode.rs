use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound accepted for any period length, in minutes.
pub const MAX_MINUTES: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [Self::Focus, Self::ShortBreak, Self::LongBreak];

    /// The mode that follows this one after a natural completion.
    ///
    /// The cycle is fixed: there is no "long break every Nth pomodoro" rule.
    pub const fn next(self) -> Self {
        match self {
            Self::Focus => Self::ShortBreak,
            Self::ShortBreak => Self::LongBreak,
            Self::LongBreak => Self::Focus,
        }
    }

    /// Configured length of this mode, in minutes.
    pub const fn minutes(self, settings: &TimerSettings) -> u32 {
        match self {
            Self::Focus => settings.focus_minutes,
            Self::ShortBreak => settings.short_break_minutes,
            Self::LongBreak => settings.long_break_minutes,
        }
    }

    pub const fn is_break(self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Stable storage key, matching the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "short_break",
            Self::LongBreak => "long_break",
        }
    }

    /// Notification text shown when a period of this mode finishes.
    pub const fn completion_message(self) -> &'static str {
        match self {
            Self::Focus => "Time for a break!",
            Self::ShortBreak | Self::LongBreak => "Break's over! Time to focus!",
        }
    }

    /// Parse user input. Accepts the storage key plus a few short aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "focus" | "f" => Some(Self::Focus),
            "short" | "short-break" | "short_break" | "shortbreak" | "sb" => {
                Some(Self::ShortBreak)
            }
            "long" | "long-break" | "long_break" | "longbreak" | "lb" => Some(Self::LongBreak),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationError::InvalidValue {
            field: "mode".into(),
            message: format!("unknown mode '{s}' (expected focus, short or long)"),
        })
    }
}

/// Period lengths, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
        }
    }
}

impl TimerSettings {
    pub fn new(focus_minutes: u32, short_break_minutes: u32, long_break_minutes: u32) -> Self {
        Self {
            focus_minutes,
            short_break_minutes,
            long_break_minutes,
        }
    }

    /// Reject any period outside `1..=MAX_MINUTES`.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.fields() {
            if !(1..=MAX_MINUTES).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field: field.into(),
                    value: u64::from(value),
                    min: 1,
                    max: u64::from(MAX_MINUTES),
                });
            }
        }
        Ok(())
    }

    /// Force every field into `1..=MAX_MINUTES`.
    pub fn clamped(self) -> Self {
        Self {
            focus_minutes: self.focus_minutes.clamp(1, MAX_MINUTES),
            short_break_minutes: self.short_break_minutes.clamp(1, MAX_MINUTES),
            long_break_minutes: self.long_break_minutes.clamp(1, MAX_MINUTES),
        }
    }

    /// Full length of `mode` in seconds.
    ///
    /// Zero-minute settings are treated as one minute so a period always has
    /// something to count down.
    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        u64::from(mode.minutes(self).max(1)) * 60
    }

    fn fields(&self) -> [(&'static str, u32); 3] {
        [
            ("focus_minutes", self.focus_minutes),
            ("short_break_minutes", self.short_break_minutes),
            ("long_break_minutes", self.long_break_minutes),
        ]
    }
}
