//! Integration tests for the SQLite session history.

use chrono::{Duration as ChronoDuration, Utc};
use commongrounds_core::{
    Cadence, Database, FocusTimer, ManualClock, SessionDraft, SessionHistory, SessionId,
    TimerDriver, TimerMode, TimerSettings,
};
use tempfile::TempDir;

fn draft(mode: TimerMode, duration: u32, completed: u32) -> SessionDraft {
    SessionDraft {
        mode,
        duration_minutes: duration,
        completed_minutes: completed,
    }
}

#[test]
fn sessions_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commongrounds.db");

    let id = {
        let mut db = Database::open_at(&path).unwrap();
        db.append(draft(TimerMode::Focus, 25, 25)).unwrap()
    };

    let db = Database::open_at(&path).unwrap();
    let sessions = db.list_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, id);
    assert_eq!(sessions[0].duration_minutes, 25);
}

#[test]
fn reopened_history_lists_newest_first() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commongrounds.db");
    let now = Utc::now();

    {
        let db = Database::open_at(&path).unwrap();
        for (offset, mode) in [
            (30, TimerMode::Focus),
            (5, TimerMode::ShortBreak),
            (60, TimerMode::LongBreak),
        ] {
            let session = draft(mode, 5, 5)
                .into_session_at(SessionId::new(), now - ChronoDuration::minutes(offset));
            db.insert_session(&session).unwrap();
        }
    }

    let db = Database::open_at(&path).unwrap();
    let modes: Vec<_> = db.list_all().iter().map(|s| s.mode).collect();
    assert_eq!(
        modes,
        vec![TimerMode::ShortBreak, TimerMode::Focus, TimerMode::LongBreak]
    );
    assert_eq!(db.recent(1).len(), 1);
    assert_eq!(db.recent(1)[0].mode, TimerMode::ShortBreak);
}

#[test]
fn clear_then_append_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commongrounds.db");

    let mut db = Database::open_at(&path).unwrap();
    db.append(draft(TimerMode::Focus, 25, 25)).unwrap();
    db.append(draft(TimerMode::ShortBreak, 5, 5)).unwrap();
    db.clear_all().unwrap();
    assert!(db.list_all().is_empty());

    db.append(draft(TimerMode::Focus, 25, 3)).unwrap();
    drop(db);

    let db = Database::open_at(&path).unwrap();
    let sessions = db.list_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].completed_minutes, 3);
}

#[test]
fn corrupt_history_reads_as_empty_and_still_accepts_appends() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commongrounds.db");

    let mut db = Database::open_at(&path).unwrap();
    db.conn()
        .execute(
            "INSERT INTO focus_sessions VALUES ('garbage', 'not a time', 'focus', 25, 25)",
            [],
        )
        .unwrap();
    assert!(db.list_all().is_empty());

    assert!(db.append(draft(TimerMode::Focus, 25, 25)).is_ok());
}

#[test]
fn driver_records_completions_in_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commongrounds.db");

    let db = Database::open_at(&path).unwrap();
    let mut driver = TimerDriver::new(
        FocusTimer::new(TimerSettings::new(1, 1, 1)),
        ManualClock::new(Cadence::default()),
        db,
    );
    driver.start();
    driver.advance_ticks(60);
    driver.advance(Cadence::default().auto_continue_delay);
    driver.advance_ticks(30);
    driver.save_to_history();
    drop(driver);

    let db = Database::open_at(&path).unwrap();
    let sessions = db.list_all();
    assert_eq!(sessions.len(), 2);
    let focus = sessions.iter().find(|s| s.mode == TimerMode::Focus).unwrap();
    assert!(focus.is_complete());
    let short = sessions
        .iter()
        .find(|s| s.mode == TimerMode::ShortBreak)
        .unwrap();
    assert_eq!(short.completed_minutes, 0);
}

#[test]
fn paused_engine_round_trips_through_kv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commongrounds.db");

    let mut timer = FocusTimer::new(TimerSettings::default());
    let mut db = Database::open_at(&path).unwrap();
    timer.start();
    for _ in 0..90 {
        timer.tick(&mut db);
    }
    db.kv_set("timer_engine", &serde_json::to_string(&timer).unwrap())
        .unwrap();
    drop(db);

    let db = Database::open_at(&path).unwrap();
    let raw = db.kv_get("timer_engine").unwrap().unwrap();
    let restored: FocusTimer = serde_json::from_str::<FocusTimer>(&raw).unwrap().into_paused();
    assert!(!restored.is_running());
    assert!(restored.has_been_started());
    assert_eq!(restored.remaining_secs(), 1500 - 90);
}
