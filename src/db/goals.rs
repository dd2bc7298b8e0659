//! Weekly goal document, goal history and the goal counter.

use crate::constants::DATE_FORMAT_ISO;
use crate::errors::{AppResult, DatabaseError};
use crate::goals::{GoalHistoryEntry, WeeklyGoal};
use crate::repository::Counter;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;

/// Reads the user's current goal document.
pub fn get_goal(conn: &Connection, user_id: &str) -> AppResult<Option<WeeklyGoal>> {
    conn.query_row(
        r#"
        SELECT goal, target_days, days_completed, is_done, start_date, total_goals_completed
        FROM weekly_goals
        WHERE user_id = ?1
        "#,
        params![user_id],
        row_to_goal,
    )
    .optional()
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Overwrites the user's goal document, counter included.
pub fn put_goal(conn: &Connection, user_id: &str, goal: &WeeklyGoal) -> AppResult<()> {
    debug!("Writing goal document for user {}", user_id);

    conn.execute(
        r#"
        INSERT INTO weekly_goals
            (user_id, goal, target_days, days_completed, is_done, start_date, total_goals_completed)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(user_id) DO UPDATE SET
            goal = excluded.goal,
            target_days = excluded.target_days,
            days_completed = excluded.days_completed,
            is_done = excluded.is_done,
            start_date = excluded.start_date,
            total_goals_completed = excluded.total_goals_completed
        "#,
        params![
            user_id,
            goal.goal,
            goal.target_days,
            goal.days_completed,
            goal.is_done,
            goal.start_date.map(|d| d.format(DATE_FORMAT_ISO).to_string()),
            goal.total_goals_completed,
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Updates progress fields, creating a blank document if none exists.
pub fn update_progress(
    conn: &Connection,
    user_id: &str,
    days_completed: u32,
    is_done: bool,
) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT INTO weekly_goals (user_id, days_completed, is_done)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id) DO UPDATE SET
            days_completed = excluded.days_completed,
            is_done = excluded.is_done
        "#,
        params![user_id, days_completed, is_done],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Clears the goal back to its blank state, keeping start date and counter.
///
/// Only touches the row while it still holds the completed run `completed`
/// describes; returns whether it did.
pub fn reset_completed_goal(
    conn: &Connection,
    user_id: &str,
    completed: &WeeklyGoal,
) -> AppResult<bool> {
    let changed = conn
        .execute(
            r#"
            UPDATE weekly_goals
            SET goal = '', target_days = 0, days_completed = 0, is_done = 0
            WHERE user_id = ?1
              AND is_done = 1
              AND goal = ?2
              AND target_days = ?3
              AND start_date IS ?4
            "#,
            params![
                user_id,
                completed.goal,
                completed.target_days,
                completed.start_date.map(|d| d.format(DATE_FORMAT_ISO).to_string()),
            ],
        )
        .map_err(DatabaseError::Sqlite)?;

    Ok(changed > 0)
}

/// Appends a history entry under `id`.
pub fn insert_history(
    conn: &Connection,
    user_id: &str,
    id: &str,
    entry: &GoalHistoryEntry,
) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT INTO goal_history (id, user_id, goal, target_days, days_completed, completed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            id,
            user_id,
            entry.goal,
            entry.target_days,
            entry.days_completed,
            entry.completed_at.format(DATE_FORMAT_ISO).to_string(),
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Lists the user's goal history, oldest first.
pub fn list_history(conn: &Connection, user_id: &str) -> AppResult<Vec<GoalHistoryEntry>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT goal, target_days, days_completed, completed_at
            FROM goal_history
            WHERE user_id = ?1
            ORDER BY seq ASC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let entries = stmt
        .query_map(params![user_id], |row| {
            Ok(GoalHistoryEntry {
                goal: row.get(0)?,
                target_days: row.get(1)?,
                days_completed: row.get(2)?,
                completed_at: parse_date_column(row, 3)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(entries)
}

/// Adds one to `counter` inside an IMMEDIATE transaction and returns the new value.
///
/// The write lock is taken before the read, so concurrent callers on other
/// connections serialize instead of losing updates.
pub fn increment_counter(conn: &mut Connection, user_id: &str, counter: Counter) -> AppResult<i64> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::Sqlite)?;
    let next = bump_counter(&tx, user_id, counter)?;
    tx.commit().map_err(DatabaseError::Sqlite)?;

    debug!("Incremented {} for user {} to {}", counter.field(), user_id, next);
    Ok(next)
}

/// Archives `entry`, bumps the completed-goals counter and marks the goal done,
/// all in one IMMEDIATE transaction. Returns the new counter value.
pub fn complete_goal(
    conn: &mut Connection,
    user_id: &str,
    history_id: &str,
    entry: &GoalHistoryEntry,
) -> AppResult<i64> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DatabaseError::Sqlite)?;
    insert_history(&tx, user_id, history_id, entry)?;
    let total = bump_counter(&tx, user_id, Counter::TotalGoalsCompleted)?;
    update_progress(&tx, user_id, entry.days_completed, true)?;
    tx.commit().map_err(DatabaseError::Sqlite)?;

    debug!("Completed goal for user {}; total now {}", user_id, total);
    Ok(total)
}

fn bump_counter(conn: &Connection, user_id: &str, counter: Counter) -> AppResult<i64> {
    let column = counter_column(counter);
    conn.execute(
        "INSERT OR IGNORE INTO weekly_goals (user_id) VALUES (?1)",
        params![user_id],
    )
    .map_err(DatabaseError::Sqlite)?;

    let current: i64 = conn
        .query_row(
            &format!("SELECT {} FROM weekly_goals WHERE user_id = ?1", column),
            params![user_id],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;

    let next = current + 1;
    conn.execute(
        &format!("UPDATE weekly_goals SET {} = ?1 WHERE user_id = ?2", column),
        params![next, user_id],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(next)
}

fn counter_column(counter: Counter) -> &'static str {
    match counter {
        Counter::TotalGoalsCompleted => "total_goals_completed",
    }
}

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<WeeklyGoal> {
    let start_date: Option<String> = row.get(4)?;
    let start_date = match start_date {
        Some(text) => Some(NaiveDate::parse_from_str(&text, DATE_FORMAT_ISO).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(WeeklyGoal {
        goal: row.get(0)?,
        target_days: row.get(1)?,
        days_completed: row.get(2)?,
        is_done: row.get(3)?,
        start_date,
        total_goals_completed: row.get(5)?,
    })
}

fn parse_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT_ISO).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
