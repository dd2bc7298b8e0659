//! Error handling utilities for the sentio application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Note that most "failures" in the analytics core are not errors at all: an
//! unparseable timestamp, a missing user or a rejected goal transition are
//! reported through `Option` or `GoalTransition` values instead.

use thiserror::Error;

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use sentio::errors::DatabaseError;
///
/// let error = DatabaseError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
/// assert!(format!("{}", error).starts_with("Database error"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}\n\nThis may indicate database connection issues. Try closing other sentio instances.")]
    Pool(#[from] r2d2::Error),
}

/// Errors raised by a `JournalRepository` implementation.
///
/// # Examples
///
/// ```
/// use sentio::errors::StoreError;
///
/// let error = StoreError::RecordNotFound { id: "abc".to_string() };
/// assert_eq!(format!("{}", error), "Journal record 'abc' does not exist");
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Update or delete addressed a record id the user does not own.
    #[error("Journal record '{id}' does not exist")]
    RecordNotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

/// Input errors for weekly goal operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalError {
    /// Target outside the 1..=7 days of a week.
    #[error("Weekly target must be between 1 and 7 days, got {0}")]
    InvalidTarget(u32),
}

/// Represents all possible errors that can occur in the sentio application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// ```
/// use sentio::errors::AppError;
///
/// let error = AppError::Config("Database path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Database path is empty");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors in journal input handling (e.g., unknown mood on the command line).
    #[error("Journal logic error: {0}")]
    Journal(String),

    /// Errors related to database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors reported by a repository implementation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid weekly goal input.
    #[error("Goal error: {0}")]
    Goal(#[from] GoalError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use sentio::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Journal("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let journal_error = AppError::Journal("Unknown mood 'Bored'".to_string());
        assert_eq!(
            format!("{}", journal_error),
            "Journal logic error: Unknown mood 'Bored'"
        );

        let goal_error: AppError = GoalError::InvalidTarget(9).into();
        assert_eq!(
            format!("{}", goal_error),
            "Goal error: Weekly target must be between 1 and 7 days, got 9"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let app_error: AppError = StoreError::RecordNotFound {
            id: "r1".to_string(),
        }
        .into();

        match app_error {
            AppError::Store(StoreError::RecordNotFound { id }) => assert_eq!(id, "r1"),
            _ => panic!("Expected AppError::Store variant"),
        }
    }

    #[test]
    fn test_database_error_wraps_sqlite() {
        let db_error: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        let app_error: AppError = db_error.into();
        assert!(format!("{}", app_error).contains("Database error"));
    }
}
