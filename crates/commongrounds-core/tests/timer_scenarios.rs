//! Integration tests for the focus timer.
//!
//! Drives the engine through a `TimerDriver` on simulated time, the way the
//! CLI drives it on the wall clock.

use std::time::Duration;

use commongrounds_core::{
    Cadence, Event, FocusTimer, ManualClock, MemoryHistory, SessionHistory, TickSource,
    TimerDriver, TimerMode, TimerSettings,
};

fn driver(settings: TimerSettings) -> TimerDriver<ManualClock, MemoryHistory> {
    TimerDriver::new(
        FocusTimer::new(settings),
        ManualClock::new(Cadence::default()),
        MemoryHistory::new(),
    )
}

#[test]
fn full_focus_period_records_once_and_auto_continues() {
    let mut d = driver(TimerSettings::new(25, 5, 15));
    d.start();

    let events = d.advance_ticks(1500);
    let completions: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, Event::TimerCompleted { .. }))
        .collect();
    assert_eq!(completions.len(), 1);

    let sessions = d.history().list_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].mode, TimerMode::Focus);
    assert_eq!(sessions[0].duration_minutes, 25);
    assert_eq!(sessions[0].completed_minutes, 25);

    assert_eq!(d.timer().mode(), TimerMode::ShortBreak);
    assert_eq!(d.timer().remaining_secs(), 300);
    assert_eq!(d.timer().completed_focus_count(), 1);

    d.advance(Cadence::default().auto_continue_delay);
    assert!(d.timer().is_running());
    assert!(d.timer().has_been_started());
    assert_eq!(d.timer().remaining_secs(), 300);
}

#[test]
fn save_to_history_after_ten_minutes() {
    let mut d = driver(TimerSettings::new(25, 5, 15));
    d.start();
    d.advance_ticks(600);

    let event = d.save_to_history();
    assert!(matches!(event, Event::SessionSaved { .. }));

    let sessions = d.history().list_all();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].completed_minutes, 10);
    assert_eq!(sessions[0].duration_minutes, 25);
    assert!(!sessions[0].is_complete());

    assert_eq!(d.timer().remaining_secs(), 1500);
    assert!(!d.timer().is_running());
    assert!(!d.clock().is_armed());
    assert_eq!(d.timer().completed_focus_count(), 0);
}

#[test]
fn settings_change_mid_countdown_waits_for_next_focus() {
    let mut d = driver(TimerSettings::new(25, 1, 1));
    d.start();
    d.advance_ticks(100);

    d.update_settings(TimerSettings::new(30, 1, 1));
    assert_eq!(d.timer().remaining_secs(), 1400);

    // Finish focus with the old countdown, then both breaks.
    d.advance_ticks(1400);
    assert_eq!(d.timer().mode(), TimerMode::ShortBreak);
    let sessions = d.history().list_all();
    assert_eq!(sessions[0].duration_minutes, 30, "record uses settings in force at completion");

    d.advance(Duration::from_millis(100));
    d.advance_ticks(60);
    d.advance(Duration::from_millis(100));
    d.advance_ticks(60);

    assert_eq!(d.timer().mode(), TimerMode::Focus);
    assert_eq!(d.timer().remaining_secs(), 1800);
}

#[test]
fn settings_change_applies_after_restart_and_switch() {
    let mut d = driver(TimerSettings::default());
    d.start();
    d.advance_ticks(10);
    d.update_settings(TimerSettings::new(30, 5, 15));
    assert_eq!(d.timer().remaining_secs(), 1490);

    d.restart();
    assert_eq!(d.timer().remaining_secs(), 1800);

    d.start();
    d.advance_ticks(10);
    d.update_settings(TimerSettings::new(30, 8, 15));
    d.switch_mode(TimerMode::ShortBreak);
    assert_eq!(d.timer().remaining_secs(), 480);
}

#[test]
fn mode_cycle_and_focus_counter() {
    let mut d = driver(TimerSettings::new(1, 1, 1));
    d.start();

    let mut finished = Vec::new();
    for _ in 0..6 {
        for event in d.advance_ticks(60) {
            if let Event::TimerCompleted { mode, .. } = event {
                finished.push(mode);
            }
        }
        d.advance(Duration::from_millis(100));
    }

    assert_eq!(
        finished,
        vec![
            TimerMode::Focus,
            TimerMode::ShortBreak,
            TimerMode::LongBreak,
            TimerMode::Focus,
            TimerMode::ShortBreak,
            TimerMode::LongBreak,
        ]
    );
    assert_eq!(d.timer().completed_focus_count(), 2);
    assert_eq!(d.history().list_all().len(), 6);
}

#[test]
fn switch_and_restart_never_count() {
    let mut d = driver(TimerSettings::new(1, 1, 1));
    d.start();
    d.advance_ticks(59);
    d.switch_mode(TimerMode::LongBreak);
    d.start();
    d.advance_ticks(59);
    d.restart();
    assert_eq!(d.timer().completed_focus_count(), 0);
    assert!(d.history().list_all().is_empty());
}

#[test]
fn duplicate_tick_signals_complete_once() {
    let mut d = driver(TimerSettings::new(1, 1, 1));
    d.start();
    d.advance_ticks(59);

    // Simulate overlapping callbacks delivering the last tick several times.
    let mut completions = 0;
    for _ in 0..5 {
        if let Some(Event::TimerCompleted { .. }) = d.on_signal(commongrounds_core::ClockSignal::Tick) {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(d.history().list_all().len(), 1);
    assert_eq!(d.timer().mode(), TimerMode::ShortBreak);
    assert_eq!(d.timer().remaining_secs(), 60);
}

#[test]
fn restart_during_auto_continue_delay_keeps_next_period_idle() {
    let mut d = driver(TimerSettings::new(1, 1, 1));
    d.start();
    d.advance_ticks(60);
    d.restart();
    d.advance(Duration::from_secs(5));
    assert!(!d.timer().is_running());
    assert_eq!(d.timer().mode(), TimerMode::ShortBreak);
}

#[test]
fn pause_then_start_resumes_same_remaining() {
    let mut d = driver(TimerSettings::default());
    d.start();
    d.advance_ticks(42);
    d.pause();
    let before = d.timer().remaining_secs();
    d.advance(Duration::from_secs(120));
    d.start();
    assert_eq!(d.timer().remaining_secs(), before);
}
