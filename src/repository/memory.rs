//! Process-local repository.
//!
//! Each user partition keeps its records and goal document next to a `watch`
//! channel, and every mutation republishes the full set. All state sits behind
//! one mutex, which also makes counter increments atomic.

use super::{new_record_id, Counter, GoalSnapshots, JournalRepository, RecordSnapshots, UserId};
use crate::errors::{AppResult, StoreError};
use crate::goals::{GoalHistoryEntry, WeeklyGoal};
use crate::journal::{JournalRecord, NewRecord, RecordPatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

struct Partition {
    records: Vec<JournalRecord>,
    records_tx: watch::Sender<Vec<JournalRecord>>,
    goal: Option<WeeklyGoal>,
    goal_tx: watch::Sender<Option<WeeklyGoal>>,
    history: Vec<(String, GoalHistoryEntry)>,
}

impl Partition {
    fn new() -> Self {
        let (records_tx, _) = watch::channel(Vec::new());
        let (goal_tx, _) = watch::channel(None);
        Partition {
            records: Vec::new(),
            records_tx,
            goal: None,
            goal_tx,
            history: Vec::new(),
        }
    }

    fn publish_records(&self) {
        self.records_tx.send_replace(self.records.clone());
    }

    fn publish_goal(&self) {
        self.goal_tx.send_replace(self.goal.clone());
    }

    fn record_mut(&mut self, id: &str) -> AppResult<&mut JournalRecord> {
        self.records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| StoreError::RecordNotFound { id: id.to_string() }.into())
    }
}

/// Repository holding everything in memory.
///
/// # Examples
///
/// ```
/// use sentio::journal::{Mood, NewRecord};
/// use sentio::repository::{InMemoryRepository, JournalRepository, UserId};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = InMemoryRepository::new();
///     let user = UserId::new("u1").unwrap();
///     let id = repo
///         .create(&user, NewRecord::mood_only(Mood::Happy, "01 Jan 2024, 09:00"))
///         .await
///         .unwrap();
///     let records = repo.fetch_once(&user).await.unwrap();
///     assert_eq!(records[0].id, id);
/// });
/// ```
#[derive(Default)]
pub struct InMemoryRepository {
    partitions: Mutex<HashMap<UserId, Partition>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_partition<T>(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut Partition) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| StoreError::TaskFailed("in-memory store lock poisoned".to_string()))?;
        let partition = partitions
            .entry(user.clone())
            .or_insert_with(Partition::new);
        f(partition)
    }
}

#[async_trait]
impl JournalRepository for InMemoryRepository {
    async fn subscribe(&self, user: &UserId) -> AppResult<RecordSnapshots> {
        self.with_partition(user, |p| Ok(WatchStream::new(p.records_tx.subscribe())))
    }

    async fn fetch_once(&self, user: &UserId) -> AppResult<Vec<JournalRecord>> {
        self.with_partition(user, |p| Ok(p.records.clone()))
    }

    async fn create(&self, user: &UserId, record: NewRecord) -> AppResult<String> {
        let id = new_record_id();
        self.with_partition(user, |p| {
            p.records.push(record.into_record(id.clone()));
            p.publish_records();
            Ok(())
        })?;
        debug!("Created record {} for user {}", id, user);
        Ok(id)
    }

    async fn update(&self, user: &UserId, id: &str, patch: RecordPatch) -> AppResult<()> {
        self.with_partition(user, |p| {
            patch.apply(p.record_mut(id)?);
            p.publish_records();
            Ok(())
        })
    }

    async fn delete(&self, user: &UserId, id: &str) -> AppResult<()> {
        self.with_partition(user, |p| {
            let before = p.records.len();
            p.records.retain(|record| record.id != id);
            if p.records.len() == before {
                return Err(StoreError::RecordNotFound { id: id.to_string() }.into());
            }
            p.publish_records();
            Ok(())
        })
    }

    async fn fetch_goal(&self, user: &UserId) -> AppResult<Option<WeeklyGoal>> {
        self.with_partition(user, |p| Ok(p.goal.clone()))
    }

    async fn subscribe_goal(&self, user: &UserId) -> AppResult<GoalSnapshots> {
        self.with_partition(user, |p| Ok(WatchStream::new(p.goal_tx.subscribe())))
    }

    async fn set_goal(&self, user: &UserId, goal: &WeeklyGoal) -> AppResult<()> {
        self.with_partition(user, |p| {
            p.goal = Some(goal.clone());
            p.publish_goal();
            Ok(())
        })
    }

    async fn update_goal_progress(
        &self,
        user: &UserId,
        days_completed: u32,
        is_done: bool,
    ) -> AppResult<()> {
        self.with_partition(user, |p| {
            let goal = p.goal.get_or_insert_with(WeeklyGoal::default);
            goal.days_completed = days_completed;
            goal.is_done = is_done;
            p.publish_goal();
            Ok(())
        })
    }

    async fn reset_completed_goal(
        &self,
        user: &UserId,
        completed: &WeeklyGoal,
    ) -> AppResult<bool> {
        self.with_partition(user, |p| {
            let Some(goal) = p.goal.as_mut() else {
                return Ok(false);
            };
            if !goal.is_done || goal.run_key() != completed.run_key() {
                return Ok(false);
            }
            goal.goal.clear();
            goal.target_days = 0;
            goal.days_completed = 0;
            goal.is_done = false;
            p.publish_goal();
            Ok(true)
        })
    }

    async fn complete_goal(&self, user: &UserId, entry: &GoalHistoryEntry) -> AppResult<i64> {
        let id = new_record_id();
        self.with_partition(user, |p| {
            p.history.push((id, entry.clone()));
            let goal = p.goal.get_or_insert_with(WeeklyGoal::default);
            goal.total_goals_completed += 1;
            goal.days_completed = entry.days_completed;
            goal.is_done = true;
            let total = goal.total_goals_completed;
            p.publish_goal();
            Ok(total)
        })
    }

    async fn append_history(&self, user: &UserId, entry: &GoalHistoryEntry) -> AppResult<String> {
        let id = new_record_id();
        self.with_partition(user, |p| {
            p.history.push((id.clone(), entry.clone()));
            Ok(())
        })?;
        Ok(id)
    }

    async fn fetch_history(&self, user: &UserId) -> AppResult<Vec<GoalHistoryEntry>> {
        self.with_partition(user, |p| {
            Ok(p.history.iter().map(|(_, entry)| entry.clone()).collect())
        })
    }

    async fn transactional_increment(&self, user: &UserId, counter: Counter) -> AppResult<i64> {
        self.with_partition(user, |p| {
            let goal = p.goal.get_or_insert_with(WeeklyGoal::default);
            let value = match counter {
                Counter::TotalGoalsCompleted => {
                    goal.total_goals_completed += 1;
                    goal.total_goals_completed
                }
            };
            p.publish_goal();
            Ok(value)
        })
    }
}
