//! The store collaborator consumed by the analytics and goal code.
//!
//! A [`JournalRepository`] owns per-user partitions of journal records, the
//! current goal document and the goal history. Snapshots are pushed as whole
//! record sets; consumers recompute their views from each one.
//!
//! Two implementations ship with the crate:
//!
//! - [`memory::InMemoryRepository`]: process-local, used by tests and embedders
//! - [`sqlite::SqliteRepository`]: durable, backed by [`crate::db::Database`]

pub mod memory;
pub mod sqlite;

use crate::constants::CURRENT_GOAL_PATH;
use crate::errors::AppResult;
use crate::goals::{GoalHistoryEntry, WeeklyGoal};
use crate::journal::{JournalRecord, NewRecord, RecordPatch};
use async_trait::async_trait;
use std::fmt;
use tokio_stream::wrappers::WatchStream;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

/// Stable identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for a blank id, which means "nobody is signed in".
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(UserId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counter fields that must be incremented atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// `totalGoalsCompleted` on the current goal document.
    TotalGoalsCompleted,
}

impl Counter {
    /// Path of the document holding the counter, relative to the user partition.
    pub fn doc_path(self) -> &'static str {
        match self {
            Counter::TotalGoalsCompleted => CURRENT_GOAL_PATH,
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            Counter::TotalGoalsCompleted => "totalGoalsCompleted",
        }
    }
}

/// Push stream of full record sets; yields the current set first.
pub type RecordSnapshots = WatchStream<Vec<JournalRecord>>;

/// Push stream of the current goal document (`None` until one is written).
pub type GoalSnapshots = WatchStream<Option<WeeklyGoal>>;

/// Per-user journal and goal storage.
///
/// Every method is scoped to one user's partition; no data is shared between
/// users. Implementations must make [`JournalRepository::transactional_increment`]
/// atomic against concurrent callers. Everything else may be last-writer-wins.
#[async_trait]
pub trait JournalRepository: Send + Sync + 'static {
    /// Subscribes to the user's record collection.
    async fn subscribe(&self, user: &UserId) -> AppResult<RecordSnapshots>;

    /// One-shot read of the user's records.
    async fn fetch_once(&self, user: &UserId) -> AppResult<Vec<JournalRecord>>;

    /// Stores a record and returns its new id.
    async fn create(&self, user: &UserId, record: NewRecord) -> AppResult<String>;

    /// Applies an edit; fails with `StoreError::RecordNotFound` for unknown ids.
    async fn update(&self, user: &UserId, id: &str, patch: RecordPatch) -> AppResult<()>;

    async fn delete(&self, user: &UserId, id: &str) -> AppResult<()>;

    /// Reads the current goal document, if one was ever written.
    async fn fetch_goal(&self, user: &UserId) -> AppResult<Option<WeeklyGoal>>;

    /// Subscribes to the current goal document.
    async fn subscribe_goal(&self, user: &UserId) -> AppResult<GoalSnapshots>;

    /// Overwrites the current goal document wholesale.
    async fn set_goal(&self, user: &UserId, goal: &WeeklyGoal) -> AppResult<()>;

    /// Updates progress fields on the current goal document.
    async fn update_goal_progress(
        &self,
        user: &UserId,
        days_completed: u32,
        is_done: bool,
    ) -> AppResult<()>;

    /// Clears goal text, target, progress and done flag; keeps the counter and start date.
    ///
    /// A compare-and-reset: nothing is written unless the stored document is
    /// still the done run `completed` (same text, target and start date).
    /// Returns whether the document was cleared.
    async fn reset_completed_goal(&self, user: &UserId, completed: &WeeklyGoal)
        -> AppResult<bool>;

    /// Archives `entry`, increments `totalGoalsCompleted` and marks the goal
    /// done with `entry.days_completed`, as one atomic step. Returns the new
    /// counter value.
    async fn complete_goal(&self, user: &UserId, entry: &GoalHistoryEntry) -> AppResult<i64>;

    /// Appends an entry to the goal history and returns its id.
    async fn append_history(&self, user: &UserId, entry: &GoalHistoryEntry) -> AppResult<String>;

    async fn fetch_history(&self, user: &UserId) -> AppResult<Vec<GoalHistoryEntry>>;

    /// Atomically adds one to `counter` and returns the new value.
    async fn transactional_increment(&self, user: &UserId, counter: Counter) -> AppResult<i64>;
}

/// Fresh record id.
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_user_id_means_signed_out() {
        assert!(UserId::new("").is_none());
        assert!(UserId::new("   ").is_none());
        assert_eq!(UserId::new(" u1 ").unwrap().as_str(), "u1");
    }

    #[test]
    fn test_counter_location() {
        assert_eq!(Counter::TotalGoalsCompleted.doc_path(), "weeklygoal/current");
        assert_eq!(Counter::TotalGoalsCompleted.field(), "totalGoalsCompleted");
    }

    #[test]
    fn test_record_ids_are_unique() {
        assert_ne!(new_record_id(), new_record_id());
    }
}
