use chrono::NaiveDate;
use futures::StreamExt;
use sentio::goals::{GoalState, GoalTransition, RejectReason, WeeklyGoal, WeeklyGoalTracker};
use sentio::repository::{InMemoryRepository, JournalRepository, UserId};
use std::sync::Arc;
use std::time::Duration;

const DELAY: Duration = Duration::from_secs(3);

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn owner() -> UserId {
    UserId::new("owner").unwrap()
}

fn setup() -> (Arc<InMemoryRepository>, WeeklyGoalTracker<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::new());
    let tracker = WeeklyGoalTracker::new(Arc::clone(&repo), Some(owner()), DELAY);
    (repo, tracker)
}

#[tokio::test(start_paused = true)]
async fn test_three_day_goal_completes_exactly_once() {
    let (repo, tracker) = setup();
    tracker.start_goal("Write", 3, day(4)).await.unwrap();

    assert_eq!(
        tracker.mark_day_done(day(4)).await.unwrap(),
        GoalTransition::Progressed {
            days_completed: 1,
            target_days: 3
        }
    );
    tracker.mark_day_done(day(5)).await.unwrap();
    assert_eq!(
        tracker.mark_day_done(day(6)).await.unwrap(),
        GoalTransition::Completed {
            goal: "Write".to_string(),
            target_days: 3,
            total_goals_completed: 1,
        }
    );

    let goal = repo.fetch_goal(&owner()).await.unwrap().unwrap();
    assert_eq!(goal.days_completed, 3);
    assert!(goal.is_done);
    assert_eq!(goal.total_goals_completed, 1);

    assert_eq!(
        tracker.mark_day_done(day(7)).await.unwrap(),
        GoalTransition::Rejected(RejectReason::AlreadyCompleted)
    );

    let history = tracker.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].target_days, 3);
    assert_eq!(history[0].days_completed, 3);
    assert_eq!(history[0].completed_at, day(6));
    assert_eq!(
        repo.fetch_goal(&owner()).await.unwrap().unwrap().total_goals_completed,
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_fires_after_grace_delay() {
    let (repo, tracker) = setup();
    tracker.start_goal("Write", 1, day(1)).await.unwrap();
    tracker.mark_day_done(day(1)).await.unwrap();

    tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
    assert_eq!(tracker.state().await.unwrap(), GoalState::Completed);

    tokio::time::sleep(Duration::from_millis(2)).await;
    tracker.settle().await.unwrap();

    let goal = repo.fetch_goal(&owner()).await.unwrap().unwrap();
    assert_eq!(goal.state(), GoalState::NoGoal);
    assert_eq!(goal.target_days, 0);
    assert_eq!(goal.days_completed, 0);
    assert!(!goal.is_done);
    assert_eq!(goal.total_goals_completed, 1);
    assert_eq!(goal.start_date, Some(day(1)));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_completed_snapshots_reset_once() {
    let (repo, tracker) = setup();
    let mut snapshots = repo.subscribe_goal(&owner()).await.unwrap();
    assert_eq!(snapshots.next().await.unwrap(), None);

    tracker.start_goal("Write", 1, day(2)).await.unwrap();
    tracker.mark_day_done(day(2)).await.unwrap();
    let completed = repo.fetch_goal(&owner()).await.unwrap().unwrap();

    for _ in 0..5 {
        tracker.observe(&completed).await;
    }
    tracker.settle().await.unwrap();
    assert_eq!(tracker.state().await.unwrap(), GoalState::NoGoal);

    // A stale redelivery after the reset must not schedule another one.
    tracker.observe(&completed).await;
    tracker.settle().await.unwrap();

    let latest = snapshots.next().await.unwrap().unwrap();
    assert_eq!(latest.state(), GoalState::NoGoal);
    assert_eq!(tracker.history().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_observe_schedules_reset_for_fresh_tracker() {
    let repo = Arc::new(InMemoryRepository::new());
    let mut goal = WeeklyGoal::new("Left over", 2, day(3)).unwrap();
    goal.days_completed = 2;
    goal.is_done = true;
    repo.set_goal(&owner(), &goal).await.unwrap();

    let tracker = WeeklyGoalTracker::new(Arc::clone(&repo), Some(owner()), DELAY);
    tracker.observe(&goal).await;
    tracker.settle().await.unwrap();

    assert_eq!(tracker.state().await.unwrap(), GoalState::NoGoal);
}

#[tokio::test(start_paused = true)]
async fn test_start_after_completion_cancels_reset() {
    let (repo, tracker) = setup();
    tracker.start_goal("Old", 1, day(1)).await.unwrap();
    tracker.mark_day_done(day(1)).await.unwrap();

    let transition = tracker.start_goal("New", 4, day(2)).await.unwrap();
    assert!(matches!(transition, GoalTransition::Started(_)));
    tracker.settle().await.unwrap();
    tokio::time::sleep(DELAY * 2).await;

    let goal = repo.fetch_goal(&owner()).await.unwrap().unwrap();
    assert_eq!(goal.goal, "New");
    assert_eq!(goal.target_days, 4);
    assert_eq!(goal.state(), GoalState::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_same_goal_twice_in_a_day_resets_both_times() {
    let (repo, tracker) = setup();

    for _ in 0..2 {
        tracker.start_goal("Same", 1, day(9)).await.unwrap();
        tracker.mark_day_done(day(9)).await.unwrap();
        tracker.settle().await.unwrap();
        assert_eq!(tracker.state().await.unwrap(), GoalState::NoGoal);
    }

    assert_eq!(tracker.goals_completed().await.unwrap(), 2);
    assert_eq!(
        repo.fetch_goal(&owner()).await.unwrap().unwrap().total_goals_completed,
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_trackers_do_not_lose_increments() {
    let repo = Arc::new(InMemoryRepository::new());
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let user = UserId::new(format!("user-{}", i % 2)).unwrap();
                repo.transactional_increment(&user, sentio::repository::Counter::TotalGoalsCompleted)
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    for i in 0..2 {
        let user = UserId::new(format!("user-{}", i)).unwrap();
        let goal = repo.fetch_goal(&user).await.unwrap().unwrap();
        assert_eq!(goal.total_goals_completed, 4);
    }
}

#[tokio::test(start_paused = true)]
async fn test_without_owner_nothing_is_written() {
    let repo = Arc::new(InMemoryRepository::new());
    let tracker = WeeklyGoalTracker::new(Arc::clone(&repo), None, DELAY);

    assert_eq!(
        tracker.start_goal("Write", 2, day(1)).await.unwrap(),
        GoalTransition::NoOwner
    );
    assert_eq!(tracker.mark_day_done(day(1)).await.unwrap(), GoalTransition::NoOwner);
    tracker.observe(&WeeklyGoal::default()).await;
    tracker.settle().await.unwrap();

    assert_eq!(tracker.state().await.unwrap(), GoalState::NoGoal);
    assert_eq!(repo.fetch_goal(&owner()).await.unwrap(), None);
    assert_eq!(tracker.goals_completed().await.unwrap(), 0);
}
