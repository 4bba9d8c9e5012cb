use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::FocusSession;

/// Totals over a slice of history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HistoryStats {
    pub total_sessions: u64,
    pub focus_sessions: u64,
    pub completed_focus_sessions: u64,
    pub total_focus_min: u64,
    pub total_break_min: u64,
    pub today_focus_sessions: u64,
    pub today_focus_min: u64,
}

impl HistoryStats {
    /// Aggregate `sessions`, counting "today" by local calendar date.
    ///
    /// Minutes are the minutes actually completed, so a partial save counts
    /// only the part that was worked.
    pub fn from_sessions(sessions: &[FocusSession], today: NaiveDate) -> Self {
        let mut stats = Self::default();
        for session in sessions {
            let minutes = u64::from(session.completed_minutes);
            stats.total_sessions += 1;
            if session.mode.is_break() {
                stats.total_break_min += minutes;
                continue;
            }
            stats.focus_sessions += 1;
            stats.total_focus_min += minutes;
            if session.is_complete() {
                stats.completed_focus_sessions += 1;
            }
            if session.timestamp.with_timezone(&Local).date_naive() == today {
                stats.today_focus_sessions += 1;
                stats.today_focus_min += minutes;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerMode;
    use crate::history::{SessionDraft, SessionId};
    use chrono::{Duration, Utc};

    #[test]
    fn aggregates_focus_and_breaks() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let sessions = vec![
            SessionDraft {
                mode: TimerMode::Focus,
                duration_minutes: 25,
                completed_minutes: 25,
            }
            .into_session_at(SessionId::new(), now),
            SessionDraft {
                mode: TimerMode::Focus,
                duration_minutes: 25,
                completed_minutes: 10,
            }
            .into_session_at(SessionId::new(), yesterday),
            SessionDraft {
                mode: TimerMode::ShortBreak,
                duration_minutes: 5,
                completed_minutes: 5,
            }
            .into_session_at(SessionId::new(), now),
        ];

        let today = now.with_timezone(&Local).date_naive();
        let stats = HistoryStats::from_sessions(&sessions, today);
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.focus_sessions, 2);
        assert_eq!(stats.completed_focus_sessions, 1);
        assert_eq!(stats.total_focus_min, 35);
        assert_eq!(stats.total_break_min, 5);
        assert_eq!(stats.today_focus_sessions, 1);
        assert_eq!(stats.today_focus_min, 25);
    }

    #[test]
    fn empty_history_is_all_zero() {
        let stats = HistoryStats::from_sessions(&[], Local::now().date_naive());
        assert_eq!(stats, HistoryStats::default());
    }
}
