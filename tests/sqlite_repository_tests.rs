use chrono::NaiveDate;
use futures::StreamExt;
use sentio::errors::{AppError, StoreError};
use sentio::goals::{GoalHistoryEntry, GoalState, WeeklyGoal, WeeklyGoalTracker};
use sentio::journal::{Mood, NewRecord, RecordPatch};
use sentio::repository::{Counter, JournalRepository, SqliteRepository, UserId};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

#[tokio::test]
async fn test_records_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sentio.db");

    let id = {
        let repo = SqliteRepository::open(&path).unwrap();
        repo.create(
            &user("u1"),
            NewRecord::mood_only(Mood::Fear, "10 Oct 2024, 21:05")
                .with_text("Storm", "Loud thunder")
                .with_location("Home"),
        )
        .await
        .unwrap()
    };

    let repo = SqliteRepository::open(&path).unwrap();
    let records = repo.fetch_once(&user("u1")).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, id);
    assert_eq!(record.mood, "Fear");
    assert_eq!(record.title, "Storm");
    assert_eq!(record.location, "Home");
    assert!(!record.is_mood_only());
    assert!(!record.is_edited);
}

#[tokio::test]
async fn test_update_delete_and_partitions() {
    let dir = TempDir::new().unwrap();
    let repo = SqliteRepository::open(&dir.path().join("sentio.db")).unwrap();
    let id = repo
        .create(&user("u1"), NewRecord::mood_only(Mood::Neutral, "01 Jan 2024, 09:00"))
        .await
        .unwrap();

    let patch = RecordPatch {
        title: Some("Quiet".to_string()),
        content: None,
    };
    repo.update(&user("u1"), &id, patch.clone()).await.unwrap();
    let record = &repo.fetch_once(&user("u1")).await.unwrap()[0];
    assert_eq!(record.title, "Quiet");
    assert!(record.is_edited);

    let err = repo.update(&user("u2"), &id, patch).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::RecordNotFound { .. })
    ));

    repo.delete(&user("u1"), &id).await.unwrap();
    assert!(repo.fetch_once(&user("u1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_goal_snapshots_follow_writes() {
    let dir = TempDir::new().unwrap();
    let repo = SqliteRepository::open(&dir.path().join("sentio.db")).unwrap();
    let owner = user("u1");
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    let mut snapshots = repo.subscribe_goal(&owner).await.unwrap();
    assert_eq!(snapshots.next().await.unwrap(), None);

    let goal = WeeklyGoal::new("Write", 2, today).unwrap();
    repo.set_goal(&owner, &goal).await.unwrap();
    assert_eq!(snapshots.next().await.unwrap(), Some(goal));

    repo.update_goal_progress(&owner, 1, false).await.unwrap();
    let snapshot = snapshots.next().await.unwrap().unwrap();
    assert_eq!(snapshot.days_completed, 1);
}

#[tokio::test]
async fn test_history_round_trip() {
    let dir = TempDir::new().unwrap();
    let repo = SqliteRepository::open(&dir.path().join("sentio.db")).unwrap();
    let entry = GoalHistoryEntry {
        goal: "Write".to_string(),
        target_days: 5,
        days_completed: 5,
        completed_at: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
    };

    let first = repo.append_history(&user("u1"), &entry).await.unwrap();
    let second = repo.append_history(&user("u1"), &entry).await.unwrap();
    assert_ne!(first, second);

    assert_eq!(repo.fetch_history(&user("u1")).await.unwrap(), vec![entry.clone(), entry]);
    assert!(repo.fetch_history(&user("u2")).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_increments_from_separate_handles_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sentio.db");
    SqliteRepository::open(&path).unwrap();

    let handles: Vec<Arc<SqliteRepository>> = (0..3)
        .map(|_| Arc::new(SqliteRepository::open(&path).unwrap()))
        .collect();

    let tasks: Vec<_> = (0..30)
        .map(|i| {
            let repo = Arc::clone(&handles[i % handles.len()]);
            tokio::spawn(async move {
                repo.transactional_increment(&user("u1"), Counter::TotalGoalsCompleted)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut values = Vec::new();
    for task in tasks {
        values.push(task.await.unwrap());
    }
    values.sort_unstable();
    assert_eq!(values, (1..=30).collect::<Vec<i64>>());

    let goal = handles[0].fetch_goal(&user("u1")).await.unwrap().unwrap();
    assert_eq!(goal.total_goals_completed, 30);
}

#[tokio::test]
async fn test_tracker_over_sqlite() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(SqliteRepository::open(&dir.path().join("sentio.db")).unwrap());
    let tracker =
        WeeklyGoalTracker::new(Arc::clone(&repo), Some(user("u1")), Duration::from_millis(5));
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    tracker.start_goal("Write", 2, today).await.unwrap();
    tracker.mark_day_done(today).await.unwrap();
    tracker.mark_day_done(today).await.unwrap();
    tracker.settle().await.unwrap();

    let goal = repo.fetch_goal(&user("u1")).await.unwrap().unwrap();
    assert_eq!(goal.state(), GoalState::NoGoal);
    assert_eq!(goal.total_goals_completed, 1);
    assert_eq!(tracker.goals_completed().await.unwrap(), 1);
}

#[tokio::test]
async fn test_stale_reset_does_not_clear_a_new_goal() {
    let dir = TempDir::new().unwrap();
    let repo = SqliteRepository::open(&dir.path().join("sentio.db")).unwrap();
    let owner = user("u1");
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    repo.set_goal(&owner, &WeeklyGoal::new("Old", 1, today).unwrap())
        .await
        .unwrap();
    let entry = GoalHistoryEntry {
        goal: "Old".to_string(),
        target_days: 1,
        days_completed: 1,
        completed_at: today,
    };
    repo.complete_goal(&owner, &entry).await.unwrap();
    let completed = repo.fetch_goal(&owner).await.unwrap().unwrap();

    // The new goal lands before the reset for the old run is applied.
    let fresh = WeeklyGoal::new("New", 3, today).unwrap();
    repo.set_goal(&owner, &fresh).await.unwrap();
    assert!(!repo.reset_completed_goal(&owner, &completed).await.unwrap());

    assert_eq!(repo.fetch_goal(&owner).await.unwrap(), Some(fresh));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restart_during_reset_keeps_new_goal() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(SqliteRepository::open(&dir.path().join("sentio.db")).unwrap());
    let owner = user("u1");
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    for round in 0..20u32 {
        let tracker = WeeklyGoalTracker::new(Arc::clone(&repo), Some(owner.clone()), Duration::ZERO);
        tracker.start_goal("Old", 1, today).await.unwrap();
        tracker.mark_day_done(today).await.unwrap();

        // The zero-delay reset races this start; either order must leave "New".
        let text = format!("New {}", round);
        tracker.start_goal(&text, 2, today).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let goal = repo.fetch_goal(&owner).await.unwrap().unwrap();
        assert_eq!(goal.goal, text);
        assert_eq!(goal.state(), GoalState::InProgress);

        // Clear the in-progress goal so the next round can start.
        repo.set_goal(&owner, &WeeklyGoal::default()).await.unwrap();
    }
}

#[tokio::test]
async fn test_completion_is_written_in_one_step() {
    let dir = TempDir::new().unwrap();
    let repo = SqliteRepository::open(&dir.path().join("sentio.db")).unwrap();
    let owner = user("u1");
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    repo.set_goal(&owner, &WeeklyGoal::new("Write", 2, today).unwrap())
        .await
        .unwrap();

    let mut snapshots = repo.subscribe_goal(&owner).await.unwrap();
    snapshots.next().await.unwrap();

    let entry = GoalHistoryEntry {
        goal: "Write".to_string(),
        target_days: 2,
        days_completed: 2,
        completed_at: today,
    };
    assert_eq!(repo.complete_goal(&owner, &entry).await.unwrap(), 1);

    let snapshot = snapshots.next().await.unwrap().unwrap();
    assert!(snapshot.is_done);
    assert_eq!(snapshot.total_goals_completed, 1);
    assert_eq!(repo.fetch_history(&owner).await.unwrap(), vec![entry]);
}
