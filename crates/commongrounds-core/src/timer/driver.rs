//! Wires one engine to one tick source and one history store.
//!
//! The driver keeps the tick source armed exactly while the engine is
//! running, and turns a natural completion into a scheduled auto-continue.

use std::time::Duration;

use tracing::debug;

use super::clock::{ClockSignal, ManualClock, TickSource};
use super::engine::FocusTimer;
use super::mode::{TimerMode, TimerSettings};
use crate::events::Event;
use crate::history::SessionHistory;

pub struct TimerDriver<C, H> {
    timer: FocusTimer,
    clock: C,
    history: H,
    auto_continue: bool,
}

impl<C: TickSource, H: SessionHistory> TimerDriver<C, H> {
    pub fn new(timer: FocusTimer, clock: C, history: H) -> Self {
        let mut driver = Self {
            timer,
            clock,
            history,
            auto_continue: true,
        };
        driver.sync_clock();
        driver
    }

    /// Turn auto-continue on or off. When off, a completed period waits
    /// for an explicit `start`.
    pub fn with_auto_continue(mut self, enabled: bool) -> Self {
        self.auto_continue = enabled;
        self
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn into_parts(self) -> (FocusTimer, C, H) {
        (self.timer, self.clock, self.history)
    }

    pub fn start(&mut self) -> Option<Event> {
        let event = self.timer.start();
        self.sync_clock();
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.timer.pause();
        self.sync_clock();
        event
    }

    pub fn restart(&mut self) -> Event {
        let event = self.timer.restart();
        self.sync_clock();
        event
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Event {
        let event = self.timer.switch_mode(mode);
        self.sync_clock();
        event
    }

    pub fn update_settings(&mut self, settings: TimerSettings) -> Event {
        self.timer.update_settings(settings)
    }

    pub fn save_to_history(&mut self) -> Event {
        let event = self.timer.save_to_history(&mut self.history);
        self.sync_clock();
        event
    }

    /// Handle one signal from the tick source.
    pub fn on_signal(&mut self, signal: ClockSignal) -> Option<Event> {
        match signal {
            ClockSignal::Tick => {
                let event = self.timer.tick(&mut self.history);
                if matches!(event, Some(Event::TimerCompleted { .. })) {
                    self.clock.disarm();
                    if self.auto_continue {
                        self.clock.schedule_auto_continue();
                        debug!(next_mode = %self.timer.mode(), "auto-continue scheduled");
                    }
                } else if !self.timer.is_running() {
                    // Late tick from a disarmed generation.
                    self.sync_clock();
                }
                event
            }
            ClockSignal::AutoContinue => {
                let event = self.timer.auto_continue();
                self.sync_clock();
                event
            }
        }
    }

    fn sync_clock(&mut self) {
        match (self.timer.is_running(), self.clock.is_armed()) {
            (true, false) => self.clock.arm(),
            (false, true) => self.clock.disarm(),
            _ => {}
        }
    }
}

impl<H: SessionHistory> TimerDriver<ManualClock, H> {
    /// Move simulated time forward, handling every signal that falls due in
    /// order. Returns the events produced.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Event> {
        let until = self.clock.now() + elapsed;
        let mut events = Vec::new();
        while let Some(signal) = self.clock.pop_due(until) {
            events.extend(self.on_signal(signal));
        }
        self.clock.settle(until);
        events
    }

    /// Advance by `n` tick intervals.
    pub fn advance_ticks(&mut self, n: u32) -> Vec<Event> {
        let interval = self.clock.cadence().tick_interval;
        self.advance(interval * n)
    }
}
