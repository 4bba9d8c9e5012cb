//! Focus timer engine.
//!
//! A tick-counting state machine. It owns no thread and no timer: the
//! caller delivers one `tick()` per elapsed second and one `auto_continue()`
//! after a natural completion (see [`TimerDriver`](super::TimerDriver)).
//!
//! ## State Transitions
//!
//! ```text
//! Idle(fresh) --start--> Running --pause--> Idle(started) --start--> Running
//! Running --countdown hits 0--> Idle(next mode, latched) --auto_continue--> Running
//! any --restart | switch_mode--> Idle(fresh)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::new(TimerSettings::default());
//! let mut history = MemoryHistory::new();
//! timer.start();
//! // Once per second:
//! if let Some(event) = timer.tick(&mut history) {
//!     // Period finished; call timer.auto_continue() after a short delay.
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::mode::{TimerMode, TimerSettings, MAX_MINUTES};
use crate::events::Event;
use crate::history::{SessionDraft, SessionHistory, SessionId};

/// Core timer engine.
///
/// All mutation goes through the methods below; the front end only reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTimer {
    settings: TimerSettings,
    mode: TimerMode,
    remaining_secs: u64,
    /// Length of the period in flight. Fixed once the period is started, so
    /// settings edits cannot rewrite the time already worked.
    #[serde(default)]
    period_secs: u64,
    #[serde(default)]
    is_running: bool,
    /// Set once the current period has been explicitly started. While
    /// false, `remaining_secs` follows settings edits.
    #[serde(default)]
    has_been_started: bool,
    #[serde(default)]
    completed_focus_count: u32,
    /// Completion latch: a period finished and the next one waits for
    /// `auto_continue`.
    #[serde(default)]
    auto_continue_pending: bool,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

impl FocusTimer {
    /// Create an idle engine in Focus mode.
    pub fn new(settings: TimerSettings) -> Self {
        Self::with_mode(settings, TimerMode::Focus)
    }

    pub fn with_mode(settings: TimerSettings, mode: TimerMode) -> Self {
        let settings = settings.clamped();
        let period_secs = settings.duration_secs(mode);
        Self {
            settings,
            mode,
            remaining_secs: period_secs,
            period_secs,
            is_running: false,
            has_been_started: false,
            completed_focus_count: 0,
            auto_continue_pending: false,
        }
    }

    /// Bring a deserialized engine back to a safe resting state.
    ///
    /// A restored engine is never running and never latched. A fresh period
    /// picks up the current settings; a started one keeps its progress and
    /// its period length, clamped into range.
    pub fn into_paused(mut self) -> Self {
        self.settings = self.settings.clamped();
        self.is_running = false;
        self.auto_continue_pending = false;
        if !self.has_been_started || self.period_secs == 0 {
            // Fresh, or saved before the period length was persisted.
            self.period_secs = self.mode_secs();
        }
        self.period_secs = self.period_secs.clamp(60, u64::from(MAX_MINUTES) * 60);
        if self.has_been_started {
            self.remaining_secs = self.remaining_secs.min(self.period_secs);
        } else {
            self.remaining_secs = self.period_secs;
        }
        if self.remaining_secs == 0 {
            self.reset_period();
        }
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn has_been_started(&self) -> bool {
        self.has_been_started
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn auto_continue_pending(&self) -> bool {
        self.auto_continue_pending
    }

    /// Full length of the period in flight. Matches the current settings
    /// except after an edit made while the period was started.
    pub fn total_secs(&self) -> u64 {
        self.period_secs
    }

    /// Seconds counted down so far in the current period.
    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs().saturating_sub(self.remaining_secs)
    }

    /// 0.0 .. 1.0 progress within the current period.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - (self.remaining_secs as f64 / total as f64)).clamp(0.0, 1.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress(),
            is_running: self.is_running,
            has_been_started: self.has_been_started,
            completed_focus_count: self.completed_focus_count,
            settings: self.settings,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume the countdown. `None` if already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        self.is_running = true;
        self.has_been_started = true;
        self.auto_continue_pending = false;
        debug!(mode = %self.mode, remaining_secs = self.remaining_secs, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Stop the countdown, keeping progress. `None` if already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        debug!(mode = %self.mode, remaining_secs = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Reset the current mode to its full length.
    pub fn restart(&mut self) -> Event {
        self.reset_period();
        debug!(mode = %self.mode, remaining_secs = self.remaining_secs, "timer restarted");
        Event::TimerRestarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Jump to `mode`, abandoning the current period without recording it.
    pub fn switch_mode(&mut self, mode: TimerMode) -> Event {
        let from = self.mode;
        self.mode = mode;
        self.reset_period();
        debug!(%from, to = %mode, remaining_secs = self.remaining_secs, "mode switched");
        Event::ModeSwitched {
            from,
            to: mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Replace the settings, clamping each period into range.
    ///
    /// A fresh period picks up the new length at once; a started one keeps
    /// counting and the change applies at the next reset, switch or
    /// completion.
    pub fn update_settings(&mut self, settings: TimerSettings) -> Event {
        let settings = settings.clamped();
        self.settings = settings;
        let applied_now = !self.has_been_started;
        if applied_now {
            self.period_secs = self.mode_secs();
            self.remaining_secs = self.period_secs;
        }
        debug!(?settings, applied_now, remaining_secs = self.remaining_secs, "settings updated");
        Event::SettingsUpdated {
            settings,
            applied_now,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Count down one second. Returns `Some(Event::TimerCompleted)` when the
    /// period finishes.
    ///
    /// Ticks that arrive while the engine is not running are ignored, which
    /// covers late ticks after a pause and duplicates after a completion.
    pub fn tick<H: SessionHistory + ?Sized>(&mut self, history: &mut H) -> Option<Event> {
        if !self.is_running {
            trace!(mode = %self.mode, "tick ignored while idle");
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        Some(self.complete(history))
    }

    /// Start the period queued by the last natural completion.
    ///
    /// `None` when nothing is queued: the user already started, restarted or
    /// switched during the delay, or this is a duplicate signal.
    pub fn auto_continue(&mut self) -> Option<Event> {
        if !self.auto_continue_pending {
            return None;
        }
        self.auto_continue_pending = false;
        if self.is_running {
            return None;
        }
        self.is_running = true;
        self.has_been_started = true;
        debug!(mode = %self.mode, remaining_secs = self.remaining_secs, "auto-continued");
        Some(Event::AutoContinued {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Record the current period as worked so far, then reset it.
    ///
    /// Completed minutes are the elapsed seconds floored to whole minutes.
    /// The focus counter does not move.
    pub fn save_to_history<H: SessionHistory + ?Sized>(&mut self, history: &mut H) -> Event {
        let elapsed_min = self.elapsed_secs() / 60;
        let draft = SessionDraft {
            mode: self.mode,
            duration_minutes: self.period_minutes(),
            completed_minutes: u32::try_from(elapsed_min).unwrap_or(u32::MAX),
        };
        let session_id = record(history, draft);
        self.reset_period();
        debug!(mode = %draft.mode, completed_minutes = draft.completed_minutes, "session saved");
        Event::SessionSaved {
            mode: draft.mode,
            session_id,
            duration_minutes: draft.duration_minutes,
            completed_minutes: draft.completed_minutes,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete<H: SessionHistory + ?Sized>(&mut self, history: &mut H) -> Event {
        self.is_running = false;

        let finished = self.mode;
        let minutes = self.period_minutes();
        let session_id = record(
            history,
            SessionDraft {
                mode: finished,
                duration_minutes: minutes,
                completed_minutes: minutes,
            },
        );

        if finished == TimerMode::Focus {
            self.completed_focus_count += 1;
        }

        self.mode = finished.next();
        self.has_been_started = false;
        self.period_secs = self.mode_secs();
        self.remaining_secs = self.period_secs;
        self.auto_continue_pending = true;

        info!(
            mode = %finished,
            next_mode = %self.mode,
            minutes,
            completed_focus_count = self.completed_focus_count,
            "period completed"
        );
        Event::TimerCompleted {
            mode: finished,
            next_mode: self.mode,
            session_id,
            completed_focus_count: self.completed_focus_count,
            message: finished.completion_message().to_string(),
            at: Utc::now(),
        }
    }

    fn reset_period(&mut self) {
        self.is_running = false;
        self.has_been_started = false;
        self.auto_continue_pending = false;
        self.period_secs = self.mode_secs();
        self.remaining_secs = self.period_secs;
    }

    fn mode_secs(&self) -> u64 {
        self.settings.duration_secs(self.mode)
    }

    fn period_minutes(&self) -> u32 {
        u32::try_from(self.period_secs / 60).unwrap_or(u32::MAX).max(1)
    }
}

fn record<H: SessionHistory + ?Sized>(history: &mut H, draft: SessionDraft) -> Option<SessionId> {
    match history.append(draft) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, mode = %draft.mode, "failed to record session");
            None
        }
    }
}

/// Format seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
