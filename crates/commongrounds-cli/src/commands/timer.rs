use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;

use clap::Subcommand;
use commongrounds_core::{
    format_clock, ClockSignal, Config, Database, Event, FocusTimer, ManualClock, ThreadTicker,
    TimerDriver, TimerMode, TimerSettings,
};
use tracing::{debug, warn};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown interactively, reading commands from stdin
    Run {
        /// Mode to begin in (focus, short, long)
        #[arg(long)]
        mode: Option<TimerMode>,
        /// Focus length in minutes for this run
        #[arg(long)]
        focus: Option<u32>,
        /// Short break length in minutes for this run
        #[arg(long)]
        short: Option<u32>,
        /// Long break length in minutes for this run
        #[arg(long)]
        long: Option<u32>,
        /// Ignore the saved timer and begin a fresh period
        #[arg(long)]
        fresh: bool,
        /// Wait for `start` after each completed period
        #[arg(long)]
        no_auto_start: bool,
    },
    /// Print the saved timer state as JSON
    Status,
    /// Discard the saved timer state
    Reset,
    /// Run the timer on simulated time and print events as JSON lines
    Simulate {
        /// Number of one-second ticks to simulate
        #[arg(long)]
        ticks: u32,
        /// Mode to begin in (focus, short, long)
        #[arg(long)]
        mode: Option<TimerMode>,
    },
}

/// Everything the run loop reacts to, in arrival order.
enum Input {
    Clock(ClockSignal),
    Line(String),
    Eof,
}

impl From<ClockSignal> for Input {
    fn from(signal: ClockSignal) -> Self {
        Input::Clock(signal)
    }
}

/// A parsed line command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Restart,
    Mode(TimerMode),
    Save,
    Set(TimerSettings),
    Status,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  s, start              start or resume
  p, pause              pause
  r, restart            reset the current period
  m, mode <mode>        switch to focus, short or long
  save                  record the time worked so far and reset
  set <f> <s> <l>       change focus, short and long break minutes
  status                print the current state
  h, help               show this help
  q, quit               pause, save state and exit";

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_lowercase().as_str() {
        "s" | "start" => Command::Start,
        "p" | "pause" => Command::Pause,
        "r" | "restart" => Command::Restart,
        "save" => Command::Save,
        "status" => Command::Status,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "m" | "mode" => {
            let [name] = args.as_slice() else {
                return Err("usage: mode <focus|short|long>".into());
            };
            let mode = name.parse::<TimerMode>().map_err(|e| e.to_string())?;
            return Ok(Command::Mode(mode));
        }
        "set" => {
            let [focus, short, long] = args.as_slice() else {
                return Err("usage: set <focus> <short> <long>".into());
            };
            let minutes = |s: &str| {
                s.parse::<u32>()
                    .map_err(|_| format!("'{s}' is not a whole number of minutes"))
            };
            let settings = TimerSettings::new(minutes(focus)?, minutes(short)?, minutes(long)?);
            settings.validate().map_err(|e| e.to_string())?;
            return Ok(Command::Set(settings));
        }
        other => return Err(format!("unknown command '{other}' (type 'help')")),
    };

    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("'{head}' takes no arguments"))
    }
}

fn load_engine(db: &Database) -> Option<FocusTimer> {
    match db.kv_get(ENGINE_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<FocusTimer>(&json) {
            Ok(engine) => Some(engine.into_paused()),
            Err(e) => {
                warn!(error = %e, "saved timer unreadable, starting fresh");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "failed to read saved timer");
            None
        }
    }
}

fn save_engine(db: &Database, engine: &FocusTimer) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Settings from config with per-run overrides applied.
fn effective_settings(
    config: &Config,
    focus: Option<u32>,
    short: Option<u32>,
    long: Option<u32>,
) -> Result<TimerSettings, Box<dyn std::error::Error>> {
    let mut settings = config.timer;
    if let Some(minutes) = focus {
        settings.focus_minutes = minutes;
    }
    if let Some(minutes) = short {
        settings.short_break_minutes = minutes;
    }
    if let Some(minutes) = long {
        settings.long_break_minutes = minutes;
    }
    settings.validate()?;
    Ok(settings)
}

fn describe(event: &Event) -> String {
    match event {
        Event::TimerStarted { mode, remaining_secs, .. } => {
            format!("{mode} started ({})", format_clock(*remaining_secs))
        }
        Event::TimerPaused { mode, remaining_secs, .. } => {
            format!("{mode} paused at {}", format_clock(*remaining_secs))
        }
        Event::TimerRestarted { mode, remaining_secs, .. } => {
            format!("{mode} reset to {}", format_clock(*remaining_secs))
        }
        Event::ModeSwitched { to, remaining_secs, .. } => {
            format!("switched to {to} ({})", format_clock(*remaining_secs))
        }
        Event::SettingsUpdated { settings, applied_now, .. } => {
            let when = if *applied_now { "now" } else { "from the next period" };
            format!(
                "settings {}/{}/{} apply {when}",
                settings.focus_minutes, settings.short_break_minutes, settings.long_break_minutes
            )
        }
        Event::TimerCompleted { mode, next_mode, completed_focus_count, .. } => {
            format!("{mode} complete ({completed_focus_count} focus completed), next: {next_mode}")
        }
        Event::AutoContinued { mode, remaining_secs, .. } => {
            format!("{mode} started ({})", format_clock(*remaining_secs))
        }
        Event::SessionSaved { mode, completed_minutes, duration_minutes, session_id, .. } => {
            if session_id.is_some() {
                format!("saved {mode}: {completed_minutes}/{duration_minutes} min")
            } else {
                format!("{mode} could not be saved to history")
            }
        }
        Event::StateSnapshot { mode, remaining_secs, is_running, completed_focus_count, .. } => {
            let state = if *is_running { "running" } else { "paused" };
            format!(
                "{mode} {} {state}, {completed_focus_count} focus completed",
                format_clock(*remaining_secs)
            )
        }
    }
}

fn spawn_stdin_reader(tx: Sender<Input>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "stdin closed with error");
                    break;
                }
            }
        }
        let _ = tx.send(Input::Eof);
    });
}

struct RunOptions {
    mode: Option<TimerMode>,
    focus: Option<u32>,
    short: Option<u32>,
    long: Option<u32>,
    fresh: bool,
    no_auto_start: bool,
}

fn run_interactive(opts: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let settings = effective_settings(&config, opts.focus, opts.short, opts.long)?;

    let saved = if opts.fresh { None } else { load_engine(&db) };
    let mut timer = saved.unwrap_or_else(|| FocusTimer::new(settings));
    if timer.settings() != &settings {
        timer.update_settings(settings);
    }
    if let Some(mode) = opts.mode {
        if mode != timer.mode() {
            timer.switch_mode(mode);
        }
    }

    let (tx, rx) = mpsc::channel::<Input>();
    spawn_stdin_reader(tx.clone());
    let ticker = ThreadTicker::new(config.cadence(), tx);
    let auto_continue = config.auto_start && !opts.no_auto_start;
    let mut driver = TimerDriver::new(timer, ticker, db).with_auto_continue(auto_continue);
    let notify = config.notifications.enabled;

    println!("{HELP}");
    println!("{}", describe(&driver.timer().snapshot()));

    let mut out = std::io::stdout();
    while let Ok(input) = rx.recv() {
        match input {
            Input::Clock(signal) => {
                match driver.on_signal(signal) {
                    Some(event) => {
                        debug!(kind = event.kind(), "clock event");
                        println!();
                        if let Event::TimerCompleted { message, .. } = &event {
                            if notify {
                                println!("\x07*** {message} ***");
                            }
                        }
                        println!("{}", describe(&event));
                    }
                    None if driver.timer().is_running() => {
                        let timer = driver.timer();
                        print!("\r{} {}   ", timer.mode(), timer.format_remaining());
                        out.flush()?;
                    }
                    None => {}
                }
            }
            Input::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                let event = match command {
                    Command::Start => driver.start(),
                    Command::Pause => driver.pause(),
                    Command::Restart => Some(driver.restart()),
                    Command::Mode(mode) => Some(driver.switch_mode(mode)),
                    Command::Save => Some(driver.save_to_history()),
                    Command::Set(settings) => Some(driver.update_settings(settings)),
                    Command::Status => Some(driver.timer().snapshot()),
                    Command::Help => {
                        println!("{HELP}");
                        None
                    }
                    Command::Quit => break,
                };
                if let Some(event) = event {
                    println!("{}", describe(&event));
                }
            }
            Input::Eof => break,
        }
    }

    let (timer, _ticker, db) = driver.into_parts();
    save_engine(&db, &timer.into_paused())?;
    println!();
    println!("timer saved");
    Ok(())
}

fn simulate(ticks: u32, mode: Option<TimerMode>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    let timer = FocusTimer::with_mode(config.timer, mode.unwrap_or(TimerMode::Focus));
    let mut driver = TimerDriver::new(timer, ManualClock::new(config.cadence()), db)
        .with_auto_continue(config.auto_start);

    let mut events = Vec::new();
    events.extend(driver.start());
    events.extend(driver.advance_ticks(ticks));
    events.push(driver.timer().snapshot());

    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            mode,
            focus,
            short,
            long,
            fresh,
            no_auto_start,
        } => run_interactive(RunOptions {
            mode,
            focus,
            short,
            long,
            fresh,
            no_auto_start,
        }),
        TimerAction::Status => {
            let db = Database::open()?;
            let settings = Config::load()?.timer;
            let engine = load_engine(&db).unwrap_or_else(|| FocusTimer::new(settings));
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            Ok(())
        }
        TimerAction::Reset => {
            let db = Database::open()?;
            if db.kv_delete(ENGINE_KEY)? {
                println!("timer reset");
            } else {
                println!("no saved timer");
            }
            Ok(())
        }
        TimerAction::Simulate { ticks, mode } => simulate(ticks, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_command("s"), Ok(Command::Start));
        assert_eq!(parse_command("  PAUSE "), Ok(Command::Pause));
        assert_eq!(parse_command("r"), Ok(Command::Restart));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("save"), Ok(Command::Save));
    }

    #[test]
    fn parses_mode_argument() {
        assert_eq!(parse_command("m long"), Ok(Command::Mode(TimerMode::LongBreak)));
        assert_eq!(parse_command("mode short"), Ok(Command::Mode(TimerMode::ShortBreak)));
        assert!(parse_command("mode").is_err());
        assert!(parse_command("mode nap").is_err());
    }

    #[test]
    fn set_validates_minutes() {
        assert_eq!(
            parse_command("set 50 10 20"),
            Ok(Command::Set(TimerSettings::new(50, 10, 20)))
        );
        assert!(parse_command("set 0 5 15").is_err());
        assert!(parse_command("set 25 5").is_err());
        assert!(parse_command("set a b c").is_err());
    }

    #[test]
    fn rejects_unknown_and_extra_arguments() {
        assert!(parse_command("launch").is_err());
        assert!(parse_command("start now").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let config = Config::default();
        let settings = effective_settings(&config, Some(50), None, Some(30)).unwrap();
        assert_eq!(settings, TimerSettings::new(50, 5, 30));
        assert!(effective_settings(&config, Some(0), None, None).is_err());
    }

    #[test]
    fn completed_event_description_names_next_mode() {
        let event = Event::TimerCompleted {
            mode: TimerMode::Focus,
            next_mode: TimerMode::ShortBreak,
            session_id: None,
            completed_focus_count: 2,
            message: TimerMode::Focus.completion_message().into(),
            at: chrono::Utc::now(),
        };
        assert!(describe(&event).contains("next: Short Break"));
    }
}
