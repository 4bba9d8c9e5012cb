use crate::error::Result;

use super::{FocusSession, SessionDraft, SessionHistory, SessionId};

/// In-process history, newest first. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    sessions: Vec<FocusSession>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records, in any order.
    pub fn with_sessions(mut sessions: Vec<FocusSession>) -> Self {
        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self { sessions }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionHistory for MemoryHistory {
    fn append(&mut self, draft: SessionDraft) -> Result<SessionId> {
        let session = draft.into_session();
        let id = session.id;
        self.sessions.insert(0, session);
        Ok(id)
    }

    fn list_all(&self) -> Vec<FocusSession> {
        self.sessions.clone()
    }

    fn clear_all(&mut self) -> Result<()> {
        self.sessions.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerMode;
    use chrono::{Duration, Utc};

    fn draft(mode: TimerMode, minutes: u32) -> SessionDraft {
        SessionDraft {
            mode,
            duration_minutes: minutes,
            completed_minutes: minutes,
        }
    }

    #[test]
    fn append_returns_id_of_newest() {
        let mut history = MemoryHistory::new();
        let first = history.append(draft(TimerMode::Focus, 25)).unwrap();
        let second = history.append(draft(TimerMode::ShortBreak, 5)).unwrap();
        assert_ne!(first, second);

        let all = history.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second);
        assert_eq!(all[1].id, first);
    }

    #[test]
    fn clear_all_empties() {
        let mut history = MemoryHistory::new();
        history.append(draft(TimerMode::Focus, 25)).unwrap();
        history.clear_all().unwrap();
        assert!(history.is_empty());
        assert!(history.list_all().is_empty());
    }

    #[test]
    fn with_sessions_sorts_newest_first() {
        let now = Utc::now();
        let old = draft(TimerMode::Focus, 25).into_session_at(SessionId::new(), now - Duration::hours(2));
        let new = draft(TimerMode::LongBreak, 15).into_session_at(SessionId::new(), now);
        let history = MemoryHistory::with_sessions(vec![old.clone(), new.clone()]);
        assert_eq!(history.list_all(), vec![new, old]);
    }
}
