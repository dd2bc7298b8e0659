/*!
# Sentio - Mood Journal

Command-line front end over the sentio library: log moods, browse and edit
records, view the month calendar and statistics, and track a weekly goal.

## Usage

```text
sentio [--db PATH] [--user ID] [-v] [--log-format text|json] <COMMAND>

Commands:
  log       Record a mood, optionally with journal text
  list      List records, newest first by default
  edit      Edit a record's title or content
  delete    Delete a record
  calendar  Show the month grid with each day's dominant mood
  stats     Show mood statistics
  goal      Manage the weekly goal (show | start DAYS | done)
```

## Configuration

- `SENTIO_DB`: SQLite database path (defaults to "~/Documents/sentio/sentio.db")
- `SENTIO_USER`: signed-in user id; without one, commands do nothing
- `SENTIO_GOAL_RESET_DELAY_MS`: grace delay before a completed goal is cleared
- `RUST_LOG`: log filter (defaults to "info")
*/

use chrono::{Local, NaiveDate, NaiveDateTime};
use sentio::analytics::{todays_record, MoodSummary, YearMonth};
use sentio::cli::{CliArgs, Command, EditArgs, GoalCommand, ListArgs, LogArgs};
use sentio::config::Config;
use sentio::constants::{
    DATE_FORMAT_ISO, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME,
    TRACING_SERVICE_NAME,
};
use sentio::errors::{AppError, AppResult};
use sentio::goals::{GoalTransition, RejectReason, WeeklyGoal, WeeklyGoalTracker};
use sentio::journal::{date_resolver, Mood, MoodFilter, NewRecord, RecordPatch, RecordQuery};
use sentio::repository::{JournalRepository, SqliteRepository, UserId};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

const NOT_SIGNED_IN: &str = "Not signed in. Set SENTIO_USER or pass --user to use sentio.";

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose, &args.log_format);

    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %uuid::Uuid::new_v4()
    );

    match run(args).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, format: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if format == LOG_FORMAT_JSON {
        builder.json().with_current_span(true).init();
    } else {
        builder.with_target(false).init();
    }
}

async fn run(args: CliArgs) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);

    let config = Config::load()?.with_overrides(args.db.as_deref(), args.user.as_deref())?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let repo = Arc::new(SqliteRepository::open(&config.db_path)?);

    let Some(owner) = config.owner() else {
        info!("No signed-in user; nothing to do");
        println!("{}", NOT_SIGNED_IN);
        return Ok(());
    };

    let now = Local::now().naive_local();
    let today = now.date();

    match args.command {
        Command::Log(log) => log_record(repo.as_ref(), &owner, log, now).await,
        Command::List(list) => list_records(repo.as_ref(), &owner, list).await,
        Command::Edit(edit) => edit_record(repo.as_ref(), &owner, edit).await,
        Command::Delete { id } => {
            repo.delete(&owner, &id).await?;
            println!("Deleted {}", id);
            Ok(())
        }
        Command::Calendar { month } => {
            let month = match month {
                Some(raw) => raw.parse::<YearMonth>().map_err(AppError::Journal)?,
                None => YearMonth::of(today),
            };
            show_calendar(repo.as_ref(), &owner, month).await
        }
        Command::Stats { json } => {
            let tracker = WeeklyGoalTracker::new(
                Arc::clone(&repo),
                Some(owner.clone()),
                config.goal_reset_delay,
            );
            show_stats(repo.as_ref(), &tracker, &owner, today, json).await
        }
        Command::Goal(goal) => {
            let tracker = WeeklyGoalTracker::new(repo, Some(owner), config.goal_reset_delay);
            run_goal_command(&tracker, goal, today).await
        }
    }
}

async fn log_record<R: JournalRepository>(
    repo: &R,
    owner: &UserId,
    log: LogArgs,
    now: NaiveDateTime,
) -> AppResult<()> {
    let mood: Mood = log.mood.parse().map_err(AppError::Journal)?;
    let date = match log.at {
        Some(at) => {
            if date_resolver::parse(&at).is_none() {
                return Err(AppError::Journal(format!(
                    "Unrecognized timestamp '{}'. Expected \"dd MMM yyyy, HH:mm\"",
                    at
                )));
            }
            at
        }
        None => date_resolver::format(now),
    };

    let mut record = NewRecord::mood_only(mood, date);
    if log.title.is_some() || log.content.is_some() {
        record = record.with_text(
            log.title.unwrap_or_default(),
            log.content.unwrap_or_default(),
        );
    }
    if let Some(location) = log.location {
        record = record.with_location(location);
    }

    let id = repo.create(owner, record).await?;
    println!("{}", id);
    Ok(())
}

async fn list_records<R: JournalRepository>(
    repo: &R,
    owner: &UserId,
    list: ListArgs,
) -> AppResult<()> {
    let on_date = match list.date {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, DATE_FORMAT_ISO)
                .map_err(|e| AppError::Journal(format!("Invalid date '{}': {}", raw, e)))?,
        ),
        None => None,
    };
    let query = RecordQuery {
        search: list.search.unwrap_or_default(),
        mood: list.mood.as_deref().map(MoodFilter::parse).unwrap_or_default(),
        sort: list.sort.parse().map_err(AppError::Journal)?,
        on_date,
    };

    let records = repo.fetch_once(owner).await?;
    let hits = query.apply(&records);
    if hits.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    for record in hits {
        let edited = if record.is_edited { " (edited)" } else { "" };
        let text = if record.is_mood_only() {
            String::new()
        } else {
            format!("  {}", record.title)
        };
        println!(
            "{}  {}  {} {}{}{}",
            record.id, record.date, record.emoji, record.mood, text, edited
        );
    }
    Ok(())
}

async fn edit_record<R: JournalRepository>(
    repo: &R,
    owner: &UserId,
    edit: EditArgs,
) -> AppResult<()> {
    let patch = RecordPatch {
        title: edit.title,
        content: edit.content,
    };
    if patch.is_empty() {
        return Err(AppError::Journal(
            "Nothing to edit: pass --title and/or --content".to_string(),
        ));
    }
    repo.update(owner, &edit.id, patch).await?;
    println!("Updated {}", edit.id);
    Ok(())
}

async fn show_calendar<R: JournalRepository>(
    repo: &R,
    owner: &UserId,
    month: YearMonth,
) -> AppResult<()> {
    let records = repo.fetch_once(owner).await?;
    let summary = MoodSummary::from_records(&records, month);

    println!("{}", month);
    for cell in summary.month_grid {
        println!(
            "{}  {}",
            cell.date.format(DATE_FORMAT_ISO),
            cell.dominant_mood.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn show_stats<R: JournalRepository>(
    repo: &R,
    tracker: &WeeklyGoalTracker<R>,
    owner: &UserId,
    today: NaiveDate,
    json: bool,
) -> AppResult<()> {
    let records = repo.fetch_once(owner).await?;
    let summary = MoodSummary::from_records(&records, YearMonth::of(today));
    let goals_completed = tracker.goals_completed().await?;
    let today_record = todays_record(&records, today);

    if json {
        let output = serde_json::json!({
            "summary": summary,
            "goalsCompleted": goals_completed,
            "today": today_record,
        });
        println!("{}", output);
        return Ok(());
    }

    println!(
        "Latest mood:      {}",
        summary.latest_mood.as_deref().unwrap_or("no mood yet")
    );
    println!("Most common mood: {}", summary.most_common_mood);
    println!("Stability:        {}", summary.stability);
    println!("Journals:         {}", summary.journal_count);
    println!("Moods logged:     {}", summary.total_moods);
    println!("Goals completed:  {}", goals_completed);
    for count in summary.mood_counts.iter() {
        println!("  {:<10} {}", count.mood, count.count);
    }
    if let Some(record) = today_record {
        println!("Today:            {} {}", record.emoji, record.mood);
    }
    Ok(())
}

async fn run_goal_command<R: JournalRepository>(
    tracker: &WeeklyGoalTracker<R>,
    command: GoalCommand,
    today: NaiveDate,
) -> AppResult<()> {
    match command {
        GoalCommand::Show => {
            match tracker.current().await? {
                Some(goal) if !goal.goal.trim().is_empty() => {
                    println!(
                        "{}: {}/{} days{}",
                        goal.goal,
                        goal.days_completed,
                        goal.target_days,
                        if goal.is_done { " (done!)" } else { "" }
                    );
                    // A completed goal left behind by an interrupted run still gets cleared.
                    tracker.observe(&goal).await;
                    tracker.settle().await?;
                }
                _ => println!("No weekly goal set."),
            }
            Ok(())
        }
        GoalCommand::Start { days, text } => {
            let text = text.unwrap_or_else(|| WeeklyGoal::default_text(days));
            let transition = tracker.start_goal(&text, days, today).await?;
            print_transition(&transition);
            Ok(())
        }
        GoalCommand::Done => {
            let transition = tracker.mark_day_done(today).await?;
            print_transition(&transition);
            tracker.settle().await
        }
    }
}

fn print_transition(transition: &GoalTransition) {
    match transition {
        GoalTransition::Started(goal) => {
            println!("Started: {} (0/{} days)", goal.goal, goal.target_days)
        }
        GoalTransition::Progressed {
            days_completed,
            target_days,
        } => println!("Progress: {}/{} days", days_completed, target_days),
        GoalTransition::Completed {
            goal,
            total_goals_completed,
            ..
        } => println!(
            "Completed: {} (goals completed: {})",
            goal, total_goals_completed
        ),
        GoalTransition::Rejected(RejectReason::GoalInProgress) => {
            println!("A goal is already in progress.")
        }
        GoalTransition::Rejected(RejectReason::NoActiveGoal) => println!("No weekly goal set."),
        GoalTransition::Rejected(RejectReason::AlreadyCompleted) => {
            println!("This week's goal is already complete.")
        }
        GoalTransition::NoOwner => println!("{}", NOT_SIGNED_IN),
    }
}
