/*!
# Sentio

Sentio is a mood journal. Each check-in stores a mood label, optional journal
text and a display timestamp; from those records sentio derives a per-month
calendar of dominant moods, the latest mood, mood tallies and a 0-100 mood
stability score. A weekly journaling goal tracks progress toward a target
number of days, archives completed goals and clears itself after a short
grace period.

## Architecture

- `journal`: records, moods, timestamp parsing and list queries
- `analytics`: pure views over a record snapshot
- `goals`: the weekly goal document and its tracker
- `repository`: the async storage trait with in-memory and SQLite backends
- `db`: pooled SQLite access used by the SQLite backend
- `cli` / `config` / `errors` / `constants`: the application shell

## Usage Example

```rust
use sentio::analytics::{latest_mood, stability_score};
use sentio::journal::{Mood, NewRecord};

let records = vec![
    NewRecord::mood_only(Mood::Sad, "01 Jan 2024, 09:00").into_record("a".into()),
    NewRecord::mood_only(Mood::Happy, "01 Jan 2024, 18:00").into_record("b".into()),
];

assert_eq!(latest_mood(&records), Some("Happy"));
assert_eq!(stability_score(&records), 55);
```
*/

/// Derived mood views: calendar grid, tallies, stability
pub mod analytics;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// SQLite storage
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Weekly goal document and state machine
pub mod goals;
/// Journal records, moods and timestamps
pub mod journal;
/// Storage trait and its implementations
pub mod repository;

// Re-export important types for convenience
pub use analytics::{MoodSummary, YearMonth};
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use goals::{GoalTransition, WeeklyGoal, WeeklyGoalTracker};
pub use journal::{JournalRecord, Mood};
pub use repository::{JournalRepository, UserId};
