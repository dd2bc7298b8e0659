//! Journal record CRUD operations.
//!
//! Records are returned in insertion order, which is the "natural" order the
//! aggregation code uses for tie-breaking.

use crate::errors::{AppResult, DatabaseError};
use crate::journal::{JournalRecord, RecordPatch};
use rusqlite::{params, Connection, Row};
use tracing::debug;

/// Inserts a record into `user_id`'s partition.
///
/// # Errors
///
/// Returns an error if the database operation fails (including a duplicate id).
pub fn insert_record(conn: &Connection, user_id: &str, record: &JournalRecord) -> AppResult<()> {
    debug!("Inserting record {} for user {}", record.id, user_id);

    conn.execute(
        r#"
        INSERT INTO journal_records
            (id, user_id, emoji, mood, title, content, location, created_at, is_edited)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            record.id,
            user_id,
            record.emoji,
            record.mood,
            record.title,
            record.content,
            record.location,
            record.date,
            record.is_edited,
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Lists every record in `user_id`'s partition.
pub fn list_records(conn: &Connection, user_id: &str) -> AppResult<Vec<JournalRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, emoji, mood, title, content, location, created_at, is_edited
            FROM journal_records
            WHERE user_id = ?1
            ORDER BY seq ASC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let records = stmt
        .query_map(params![user_id], row_to_record)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    debug!("Loaded {} records for user {}", records.len(), user_id);
    Ok(records)
}

/// Retrieves one record by id.
///
/// Returns `Ok(None)` if the user has no record with that id.
pub fn get_record(conn: &Connection, user_id: &str, id: &str) -> AppResult<Option<JournalRecord>> {
    let result = conn.query_row(
        r#"
        SELECT id, emoji, mood, title, content, location, created_at, is_edited
        FROM journal_records
        WHERE user_id = ?1 AND id = ?2
        "#,
        params![user_id, id],
        row_to_record,
    );

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}

/// Applies an edit and marks the record edited.
///
/// Returns `false` when the record does not exist.
pub fn update_record(
    conn: &Connection,
    user_id: &str,
    id: &str,
    patch: &RecordPatch,
) -> AppResult<bool> {
    let Some(mut record) = get_record(conn, user_id, id)? else {
        return Ok(false);
    };
    patch.apply(&mut record);

    let changed = conn
        .execute(
            r#"
            UPDATE journal_records
            SET title = ?1, content = ?2, is_edited = ?3
            WHERE user_id = ?4 AND id = ?5
            "#,
            params![record.title, record.content, record.is_edited, user_id, id],
        )
        .map_err(DatabaseError::Sqlite)?;

    debug!("Updated record {} ({} row)", id, changed);
    Ok(changed > 0)
}

/// Deletes a record. Returns `false` when it did not exist.
pub fn delete_record(conn: &Connection, user_id: &str, id: &str) -> AppResult<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM journal_records WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(deleted > 0)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<JournalRecord> {
    Ok(JournalRecord {
        id: row.get(0)?,
        emoji: row.get(1)?,
        mood: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        location: row.get(5)?,
        date: row.get(6)?,
        is_edited: row.get(7)?,
    })
}
