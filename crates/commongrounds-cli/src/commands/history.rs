use std::io::BufRead;

use chrono::Local;
use clap::Subcommand;
use commongrounds_core::{Database, FocusSession, HistoryStats, SessionHistory};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete every recorded session
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Totals over the whole history
    Stats,
}

fn format_row(session: &FocusSession) -> String {
    let status = if session.is_complete() { "done" } else { "partial" };
    format!(
        "{}  {:<12} {:>3}/{:<3} min  {}",
        session.timestamp_local().format("%Y-%m-%d %H:%M"),
        session.mode.display_name(),
        session.completed_minutes,
        session.duration_minutes,
        status,
    )
}

fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    eprint!("{prompt} [y/N] ");
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open()?;

    match action {
        HistoryAction::List { limit, json } => {
            let sessions = match limit {
                Some(limit) => db.recent(limit),
                None => db.list_all(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("no sessions recorded");
            } else {
                for session in &sessions {
                    println!("{}", format_row(session));
                }
            }
        }
        HistoryAction::Clear { yes } => {
            if !yes && !confirm("Delete all recorded sessions?")? {
                println!("cancelled");
                return Ok(());
            }
            db.clear_all()?;
            println!("history cleared");
        }
        HistoryAction::Stats => {
            let stats = HistoryStats::from_sessions(&db.list_all(), Local::now().date_naive());
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
