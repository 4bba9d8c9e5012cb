//! # Commongrounds Core Library
//!
//! Business logic for the Commongrounds focus timer. The CLI is a thin
//! presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-counting state machine cycling
//!   focus -> short break -> long break, with auto-continue after each
//!   natural completion
//! - **Clock**: tick sources that drive the engine, either on the wall
//!   clock or in simulated time
//! - **History**: append-only session log behind the `SessionHistory` trait
//! - **Storage**: SQLite history and TOML configuration
//!
//! ## Key Components
//!
//! - [`FocusTimer`]: Core timer state machine
//! - [`TimerDriver`]: Keeps one engine, one tick source and one history in step
//! - [`Database`]: Durable session history
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod history;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use history::{FocusSession, HistoryStats, MemoryHistory, SessionDraft, SessionHistory, SessionId};
pub use storage::{Config, Database};
pub use timer::{
    format_clock, Cadence, ClockSignal, FocusTimer, ManualClock, ThreadTicker, TickSource,
    TimerDriver, TimerMode, TimerSettings,
};
