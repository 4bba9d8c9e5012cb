mod clock;
mod driver;
mod engine;
mod mode;

pub use clock::{Cadence, ClockSignal, ManualClock, ThreadTicker, TickSource};
pub use driver::TimerDriver;
pub use engine::{format_clock, FocusTimer};
pub use mode::{TimerMode, TimerSettings, MAX_MINUTES};
