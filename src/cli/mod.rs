//! Command-line interface for sentio.

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{Args, Parser, Subcommand};

/// Mood journaling with calendar and stability analytics
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, author, version, long_about = None)]
pub struct CliArgs {
    /// SQLite database path (overrides SENTIO_DB)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Signed-in user id (overrides SENTIO_USER)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Print verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON],
        default_value = LOG_FORMAT_TEXT
    )]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Record a mood, optionally with journal text
    Log(LogArgs),
    /// List records, newest first by default
    List(ListArgs),
    /// Edit a record's title or content
    Edit(EditArgs),
    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },
    /// Show the month grid with each day's dominant mood
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Show mood statistics
    Stats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage the weekly goal
    #[command(subcommand)]
    Goal(GoalCommand),
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct LogArgs {
    /// One of Angry, Fear, Sad, Neutral, Surprise, Happy
    #[arg(short, long)]
    pub mood: String,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub content: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Timestamp as "dd MMM yyyy, HH:mm" (defaults to now)
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct ListArgs {
    /// Case-insensitive text search over title, content and location
    #[arg(short, long)]
    pub search: Option<String>,

    /// Mood label, or All
    #[arg(short, long)]
    pub mood: Option<String>,

    /// newest, oldest, a-z or z-a
    #[arg(long, default_value = "newest")]
    pub sort: String,

    /// Only records on this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct EditArgs {
    /// Record id
    pub id: String,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub content: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum GoalCommand {
    /// Show the current goal
    Show,
    /// Start a new goal of DAYS journaling days this week
    Start {
        /// Target days (1-7)
        days: u32,
        /// Goal text (defaults to "Write a journal DAYS times this week")
        #[arg(long)]
        text: Option<String>,
    },
    /// Mark today as done
    Done,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse()
    }
}
