//! Durable repository on top of [`Database`].
//!
//! rusqlite is blocking, so every call runs on tokio's blocking pool with its
//! own pooled connection. Subscriptions are served from per-user `watch`
//! channels that this repository republishes after each of its own writes.

use super::{new_record_id, Counter, GoalSnapshots, JournalRepository, RecordSnapshots, UserId};
use crate::db::{self, Database};
use crate::errors::{AppResult, StoreError};
use crate::goals::{GoalHistoryEntry, WeeklyGoal};
use crate::journal::{JournalRecord, NewRecord, RecordPatch};
use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, instrument};

type Watchers<T> = Mutex<HashMap<UserId, watch::Sender<T>>>;

/// Repository persisting to a SQLite file.
pub struct SqliteRepository {
    db: Database,
    record_watchers: Watchers<Vec<JournalRecord>>,
    goal_watchers: Watchers<Option<WeeklyGoal>>,
}

impl SqliteRepository {
    /// Wraps an already opened database. The schema must exist.
    pub fn new(db: Database) -> Self {
        SqliteRepository {
            db,
            record_watchers: Mutex::new(HashMap::new()),
            goal_watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Opens the file at `path` and creates any missing tables.
    pub fn open(path: &Path) -> AppResult<Self> {
        let db = Database::open(path)?;
        db.initialize_schema()?;
        Ok(Self::new(db))
    }

    async fn run_blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = db.get_conn()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }

    async fn load_records(&self, user: &UserId) -> AppResult<Vec<JournalRecord>> {
        let user_id = user.as_str().to_string();
        self.run_blocking(move |conn| db::records::list_records(conn, &user_id))
            .await
    }

    async fn load_goal(&self, user: &UserId) -> AppResult<Option<WeeklyGoal>> {
        let user_id = user.as_str().to_string();
        self.run_blocking(move |conn| db::goals::get_goal(conn, &user_id))
            .await
    }

    async fn publish_records(&self, user: &UserId) -> AppResult<()> {
        if !has_receivers(&self.record_watchers, user)? {
            return Ok(());
        }
        let records = self.load_records(user).await?;
        publish(&self.record_watchers, user, records)
    }

    async fn publish_goal(&self, user: &UserId) -> AppResult<()> {
        if !has_receivers(&self.goal_watchers, user)? {
            return Ok(());
        }
        let goal = self.load_goal(user).await?;
        publish(&self.goal_watchers, user, goal)
    }
}

fn lock_failed() -> StoreError {
    StoreError::TaskFailed("watcher registry lock poisoned".to_string())
}

fn has_receivers<T>(watchers: &Watchers<T>, user: &UserId) -> AppResult<bool> {
    let watchers = watchers.lock().map_err(|_| lock_failed())?;
    Ok(watchers
        .get(user)
        .map(|tx| tx.receiver_count() > 0)
        .unwrap_or(false))
}

fn publish<T>(watchers: &Watchers<T>, user: &UserId, value: T) -> AppResult<()> {
    let watchers = watchers.lock().map_err(|_| lock_failed())?;
    if let Some(tx) = watchers.get(user) {
        tx.send_replace(value);
    }
    Ok(())
}

/// Returns a receiver whose current value is `value`, creating the channel on first use.
fn subscribe_with<T>(
    watchers: &Watchers<T>,
    user: &UserId,
    value: T,
) -> AppResult<watch::Receiver<T>> {
    let mut watchers = watchers.lock().map_err(|_| lock_failed())?;
    let rx = match watchers.get(user) {
        Some(tx) => {
            tx.send_replace(value);
            tx.subscribe()
        }
        None => {
            let (tx, rx) = watch::channel(value);
            watchers.insert(user.clone(), tx);
            rx
        }
    };
    Ok(rx)
}

#[async_trait]
impl JournalRepository for SqliteRepository {
    async fn subscribe(&self, user: &UserId) -> AppResult<RecordSnapshots> {
        let records = self.load_records(user).await?;
        let rx = subscribe_with(&self.record_watchers, user, records)?;
        Ok(WatchStream::new(rx))
    }

    async fn fetch_once(&self, user: &UserId) -> AppResult<Vec<JournalRecord>> {
        self.load_records(user).await
    }

    #[instrument(skip(self, user, record), fields(user = %user))]
    async fn create(&self, user: &UserId, record: NewRecord) -> AppResult<String> {
        let id = new_record_id();
        let record = record.into_record(id.clone());
        let user_id = user.as_str().to_string();
        self.run_blocking(move |conn| db::records::insert_record(conn, &user_id, &record))
            .await?;
        self.publish_records(user).await?;
        debug!("Created record {}", id);
        Ok(id)
    }

    #[instrument(skip(self, user, patch), fields(user = %user))]
    async fn update(&self, user: &UserId, id: &str, patch: RecordPatch) -> AppResult<()> {
        let user_id = user.as_str().to_string();
        let record_id = id.to_string();
        let found = self
            .run_blocking(move |conn| db::records::update_record(conn, &user_id, &record_id, &patch))
            .await?;
        if !found {
            return Err(StoreError::RecordNotFound { id: id.to_string() }.into());
        }
        self.publish_records(user).await
    }

    #[instrument(skip(self, user), fields(user = %user))]
    async fn delete(&self, user: &UserId, id: &str) -> AppResult<()> {
        let user_id = user.as_str().to_string();
        let record_id = id.to_string();
        let found = self
            .run_blocking(move |conn| db::records::delete_record(conn, &user_id, &record_id))
            .await?;
        if !found {
            return Err(StoreError::RecordNotFound { id: id.to_string() }.into());
        }
        self.publish_records(user).await
    }

    async fn fetch_goal(&self, user: &UserId) -> AppResult<Option<WeeklyGoal>> {
        self.load_goal(user).await
    }

    async fn subscribe_goal(&self, user: &UserId) -> AppResult<GoalSnapshots> {
        let goal = self.load_goal(user).await?;
        let rx = subscribe_with(&self.goal_watchers, user, goal)?;
        Ok(WatchStream::new(rx))
    }

    async fn set_goal(&self, user: &UserId, goal: &WeeklyGoal) -> AppResult<()> {
        let user_id = user.as_str().to_string();
        let goal = goal.clone();
        self.run_blocking(move |conn| db::goals::put_goal(conn, &user_id, &goal))
            .await?;
        self.publish_goal(user).await
    }

    async fn update_goal_progress(
        &self,
        user: &UserId,
        days_completed: u32,
        is_done: bool,
    ) -> AppResult<()> {
        let user_id = user.as_str().to_string();
        self.run_blocking(move |conn| {
            db::goals::update_progress(conn, &user_id, days_completed, is_done)
        })
        .await?;
        self.publish_goal(user).await
    }

    async fn reset_completed_goal(
        &self,
        user: &UserId,
        completed: &WeeklyGoal,
    ) -> AppResult<bool> {
        let user_id = user.as_str().to_string();
        let completed = completed.clone();
        let cleared = self
            .run_blocking(move |conn| {
                db::goals::reset_completed_goal(conn, &user_id, &completed)
            })
            .await?;
        if cleared {
            self.publish_goal(user).await?;
        }
        Ok(cleared)
    }

    #[instrument(skip(self, user, entry), fields(user = %user))]
    async fn complete_goal(&self, user: &UserId, entry: &GoalHistoryEntry) -> AppResult<i64> {
        let history_id = new_record_id();
        let user_id = user.as_str().to_string();
        let entry = entry.clone();
        let total = self
            .run_blocking(move |conn| {
                db::goals::complete_goal(conn, &user_id, &history_id, &entry)
            })
            .await?;
        self.publish_goal(user).await?;
        Ok(total)
    }

    async fn append_history(&self, user: &UserId, entry: &GoalHistoryEntry) -> AppResult<String> {
        let id = new_record_id();
        let history_id = id.clone();
        let user_id = user.as_str().to_string();
        let entry = entry.clone();
        self.run_blocking(move |conn| {
            db::goals::insert_history(conn, &user_id, &history_id, &entry)
        })
        .await?;
        Ok(id)
    }

    async fn fetch_history(&self, user: &UserId) -> AppResult<Vec<GoalHistoryEntry>> {
        let user_id = user.as_str().to_string();
        self.run_blocking(move |conn| db::goals::list_history(conn, &user_id))
            .await
    }

    async fn transactional_increment(&self, user: &UserId, counter: Counter) -> AppResult<i64> {
        let user_id = user.as_str().to_string();
        let value = self
            .run_blocking(move |conn| db::goals::increment_counter(conn, &user_id, counter))
            .await?;
        self.publish_goal(user).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::Mood;
    use futures::StreamExt;
    use tempfile::TempDir;

    fn open_repo() -> (TempDir, SqliteRepository) {
        let dir = TempDir::new().unwrap();
        let repo = SqliteRepository::open(&dir.path().join("sentio.db")).unwrap();
        (dir, repo)
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (_dir, repo) = open_repo();
        let id = repo
            .create(&user(), NewRecord::mood_only(Mood::Surprise, "02 Mar 2024, 18:30"))
            .await
            .unwrap();

        let records = repo.fetch_once(&user()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].emoji, Mood::Surprise.emoji());
    }

    #[tokio::test]
    async fn test_subscription_sees_own_writes() {
        let (_dir, repo) = open_repo();
        let mut snapshots = repo.subscribe(&user()).await.unwrap();
        assert!(snapshots.next().await.unwrap().is_empty());

        repo.create(&user(), NewRecord::mood_only(Mood::Happy, "02 Mar 2024, 18:30"))
            .await
            .unwrap();
        assert_eq!(snapshots.next().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_record_is_reported() {
        let (_dir, repo) = open_repo();
        let err = repo.delete(&user(), "nope").await.unwrap_err();
        assert!(err.to_string().contains("'nope' does not exist"));
    }
}
