//! Tick sources for the timer engine.
//!
//! The engine counts ticks; something else decides when they happen.
//! [`ThreadTicker`] uses the wall clock and a background thread,
//! [`ManualClock`] uses simulated time so tests run instantly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What a tick source delivers to its driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// One second of countdown has elapsed.
    Tick,
    /// The pause after a natural completion is over.
    AutoContinue,
}

/// Timing parameters of a tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub tick_interval: Duration,
    /// Gap between a natural completion and the auto-start of the next period.
    pub auto_continue_delay: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            auto_continue_delay: Duration::from_millis(100),
        }
    }
}

/// A periodic tick provider plus a one-shot auto-continue timer.
pub trait TickSource {
    /// Start delivering ticks, one interval from now. Re-arming restarts the
    /// phase.
    ///
    /// A partial interval is not carried across a disarm: each resume waits
    /// a full interval for its first tick, so pausing and resuming faster
    /// than the interval never counts down.
    fn arm(&mut self);

    /// Stop delivering ticks. A tick already in flight may still arrive.
    fn disarm(&mut self);

    /// Deliver one [`ClockSignal::AutoContinue`] after the auto-continue delay.
    fn schedule_auto_continue(&mut self);

    fn is_armed(&self) -> bool;

    fn cadence(&self) -> Cadence;
}

/// Wall-clock tick source backed by background threads.
///
/// Signals are converted into `T` and sent on `tx`, so they can share one
/// channel with user input and be handled strictly in arrival order.
pub struct ThreadTicker<T> {
    cadence: Cadence,
    tx: Sender<T>,
    /// Bumped on every arm/disarm; a ticker thread exits once its generation
    /// is stale.
    generation: Arc<AtomicU64>,
    armed: bool,
}

impl<T> ThreadTicker<T>
where
    T: From<ClockSignal> + Send + 'static,
{
    pub fn new(cadence: Cadence, tx: Sender<T>) -> Self {
        Self {
            cadence,
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            armed: false,
        }
    }
}

impl<T> TickSource for ThreadTicker<T>
where
    T: From<ClockSignal> + Send + 'static,
{
    fn arm(&mut self) {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.armed = true;

        let generation = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        let interval = self.cadence.tick_interval;
        debug!(generation = mine, ?interval, "ticker armed");
        thread::spawn(move || loop {
            thread::sleep(interval);
            if generation.load(Ordering::SeqCst) != mine {
                trace!(generation = mine, "ticker thread retired");
                break;
            }
            if tx.send(T::from(ClockSignal::Tick)).is_err() {
                break;
            }
        });
    }

    fn disarm(&mut self) {
        if self.armed {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.armed = false;
            debug!("ticker disarmed");
        }
    }

    fn schedule_auto_continue(&mut self) {
        let tx = self.tx.clone();
        let delay = self.cadence.auto_continue_delay;
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(T::from(ClockSignal::AutoContinue));
        });
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }
}

impl<T> Drop for ThreadTicker<T> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Simulated tick source. Time only moves when the caller says so.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    cadence: Cadence,
    now: Duration,
    next_tick: Option<Duration>,
    auto_continue_at: Option<Duration>,
}

impl ManualClock {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            ..Self::default()
        }
    }

    /// Simulated time since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn auto_continue_scheduled(&self) -> bool {
        self.auto_continue_at.is_some()
    }

    /// Pop the earliest signal due at or before `until`, moving `now` to the
    /// instant it fires. An auto-continue wins a tie with a tick.
    pub fn pop_due(&mut self, until: Duration) -> Option<ClockSignal> {
        let tick = self.next_tick.filter(|at| *at <= until);
        let auto = self.auto_continue_at.filter(|at| *at <= until);
        match (tick, auto) {
            (None, None) => None,
            (Some(t), Some(a)) if t < a => self.fire_tick(t),
            (_, Some(a)) => self.fire_auto_continue(a),
            (Some(t), None) => self.fire_tick(t),
        }
    }

    /// Move `now` forward to `until` without firing anything.
    pub fn settle(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }

    fn fire_tick(&mut self, at: Duration) -> Option<ClockSignal> {
        self.now = at;
        self.next_tick = Some(at + self.cadence.tick_interval);
        Some(ClockSignal::Tick)
    }

    fn fire_auto_continue(&mut self, at: Duration) -> Option<ClockSignal> {
        self.now = at;
        self.auto_continue_at = None;
        Some(ClockSignal::AutoContinue)
    }
}

impl TickSource for ManualClock {
    fn arm(&mut self) {
        self.next_tick = Some(self.now + self.cadence.tick_interval);
    }

    fn disarm(&mut self) {
        self.next_tick = None;
    }

    fn schedule_auto_continue(&mut self) {
        self.auto_continue_at = Some(self.now + self.cadence.auto_continue_delay);
    }

    fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }
}
