use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::SessionId;
use crate::timer::{TimerMode, TimerSettings};

/// Every state change in the engine produces an Event.
/// The front end renders them; nothing else listens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerRestarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: TimerMode,
        to: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        settings: TimerSettings,
        /// Whether `remaining_secs` was recomputed immediately.
        applied_now: bool,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A period ran to zero. The next one is waiting for auto-continue.
    TimerCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        /// None when the history store rejected the record.
        session_id: Option<SessionId>,
        completed_focus_count: u32,
        message: String,
        at: DateTime<Utc>,
    },
    AutoContinued {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionSaved {
        mode: TimerMode,
        session_id: Option<SessionId>,
        duration_minutes: u32,
        completed_minutes: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        is_running: bool,
        has_been_started: bool,
        completed_focus_count: u32,
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerRestarted { .. } => "timer_restarted",
            Event::ModeSwitched { .. } => "mode_switched",
            Event::SettingsUpdated { .. } => "settings_updated",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::AutoContinued { .. } => "auto_continued",
            Event::SessionSaved { .. } => "session_saved",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
