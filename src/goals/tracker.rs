//! The weekly goal state machine.
//!
//! ```text
//! NoGoal --start_goal--> InProgress --mark_day_done (last day)--> Completed
//!    ^                                                               |
//!    +-------------------- reset timer (grace delay) ----------------+
//! ```
//!
//! Operations on one tracker are serialised behind an async mutex. Completion
//! archives the goal, bumps the counter and sets the done flag in one
//! repository call, then schedules a single reset per goal run. Starting a new
//! goal aborts a pending reset. A reset that is already writing cannot be
//! aborted, so the reset itself only clears the document if it still holds
//! the completed run.

use super::{GoalHistoryEntry, GoalState, WeeklyGoal};
use crate::errors::{AppResult, StoreError};
use crate::repository::{JournalRepository, UserId};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type RunKey = (String, u32, Option<NaiveDate>);

/// Why a goal operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `start_goal` while a goal is still running.
    GoalInProgress,
    /// `mark_day_done` with no goal set.
    NoActiveGoal,
    /// `mark_day_done` after the target was already reached.
    AlreadyCompleted,
}

/// Outcome of a tracker operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalTransition {
    Started(WeeklyGoal),
    Progressed {
        days_completed: u32,
        target_days: u32,
    },
    Completed {
        goal: String,
        target_days: u32,
        total_goals_completed: i64,
    },
    Rejected(RejectReason),
    /// Nobody is signed in; nothing was read or written.
    NoOwner,
}

#[derive(Default)]
struct TrackerState {
    pending_reset: Option<JoinHandle<()>>,
    /// Run the last reset was scheduled for.
    scheduled_for: Option<RunKey>,
}

/// Drives one user's `weeklygoal/current` document.
pub struct WeeklyGoalTracker<R: JournalRepository> {
    repo: Arc<R>,
    owner: Option<UserId>,
    reset_delay: Duration,
    state: Arc<Mutex<TrackerState>>,
}

impl<R: JournalRepository> WeeklyGoalTracker<R> {
    pub fn new(repo: Arc<R>, owner: Option<UserId>, reset_delay: Duration) -> Self {
        WeeklyGoalTracker {
            repo,
            owner,
            reset_delay,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// The stored goal document, or `None` without an owner or document.
    pub async fn current(&self) -> AppResult<Option<WeeklyGoal>> {
        match &self.owner {
            Some(owner) => self.repo.fetch_goal(owner).await,
            None => Ok(None),
        }
    }

    pub async fn state(&self) -> AppResult<GoalState> {
        Ok(self
            .current()
            .await?
            .map(|goal| goal.state())
            .unwrap_or(GoalState::NoGoal))
    }

    /// Starts a new goal, overwriting the stored document wholesale.
    ///
    /// Allowed from `NoGoal` and from `Completed` (cancelling the pending
    /// reset). Rejected while a goal is in progress.
    ///
    /// # Errors
    ///
    /// `GoalError::InvalidTarget` if `target_days` is outside 1..=7, or any
    /// repository error.
    pub async fn start_goal(
        &self,
        text: &str,
        target_days: u32,
        today: NaiveDate,
    ) -> AppResult<GoalTransition> {
        let Some(owner) = &self.owner else {
            return Ok(GoalTransition::NoOwner);
        };
        let goal = WeeklyGoal::new(text, target_days, today)?;

        let mut state = self.state.lock().await;
        let current = self.repo.fetch_goal(owner).await?;
        if current.as_ref().map(WeeklyGoal::state) == Some(GoalState::InProgress) {
            debug!("Refusing to start a goal while one is in progress");
            return Ok(GoalTransition::Rejected(RejectReason::GoalInProgress));
        }

        if let Some(handle) = state.pending_reset.take() {
            handle.abort();
            debug!("Cancelled pending goal reset");
        }
        state.scheduled_for = None;

        self.repo.set_goal(owner, &goal).await?;
        info!(target_days, "Started weekly goal");
        Ok(GoalTransition::Started(goal))
    }

    /// Records one more completed day.
    ///
    /// On the last day the goal is archived, the counter incremented and the
    /// done flag written atomically; the reset is scheduled afterwards.
    pub async fn mark_day_done(&self, today: NaiveDate) -> AppResult<GoalTransition> {
        let Some(owner) = &self.owner else {
            return Ok(GoalTransition::NoOwner);
        };

        let mut state = self.state.lock().await;
        let goal = match self.repo.fetch_goal(owner).await? {
            Some(goal) => goal,
            None => return Ok(GoalTransition::Rejected(RejectReason::NoActiveGoal)),
        };
        match goal.state() {
            GoalState::NoGoal => return Ok(GoalTransition::Rejected(RejectReason::NoActiveGoal)),
            GoalState::Completed => {
                return Ok(GoalTransition::Rejected(RejectReason::AlreadyCompleted))
            }
            GoalState::InProgress if goal.days_completed >= goal.target_days => {
                return Ok(GoalTransition::Rejected(RejectReason::AlreadyCompleted))
            }
            GoalState::InProgress => {}
        }

        let (days_completed, is_done) = goal.next_progress();
        if !is_done {
            self.repo
                .update_goal_progress(owner, days_completed, false)
                .await?;
            debug!(days_completed, target_days = goal.target_days, "Goal progressed");
            return Ok(GoalTransition::Progressed {
                days_completed,
                target_days: goal.target_days,
            });
        }

        let entry = GoalHistoryEntry {
            goal: goal.goal.clone(),
            target_days: goal.target_days,
            days_completed,
            completed_at: today,
        };
        let total_goals_completed = self.repo.complete_goal(owner, &entry).await?;
        info!(total_goals_completed, "Weekly goal completed");

        self.schedule_reset(&mut state, owner, &goal);
        Ok(GoalTransition::Completed {
            goal: goal.goal,
            target_days: goal.target_days,
            total_goals_completed,
        })
    }

    /// Reacts to a delivered goal snapshot.
    ///
    /// A completed document schedules its reset; redelivering the same
    /// completed document does nothing.
    pub async fn observe(&self, goal: &WeeklyGoal) {
        let Some(owner) = &self.owner else {
            return;
        };
        if goal.state() != GoalState::Completed {
            return;
        }
        let mut state = self.state.lock().await;
        self.schedule_reset(&mut state, owner, goal);
    }

    /// Waits for a scheduled reset to run. Returns immediately if none is pending.
    pub async fn settle(&self) -> AppResult<()> {
        let handle = self.state.lock().await.pending_reset.take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match handle.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(StoreError::TaskFailed(e.to_string()).into()),
        }
    }

    pub async fn history(&self) -> AppResult<Vec<GoalHistoryEntry>> {
        match &self.owner {
            Some(owner) => self.repo.fetch_history(owner).await,
            None => Ok(Vec::new()),
        }
    }

    /// Count of archived goals that reached their target.
    pub async fn goals_completed(&self) -> AppResult<usize> {
        Ok(super::goals_completed(&self.history().await?))
    }

    fn schedule_reset(&self, state: &mut TrackerState, owner: &UserId, completed: &WeeklyGoal) {
        let key = completed.run_key();
        if state.scheduled_for.as_ref() == Some(&key) {
            debug!("Goal reset already scheduled for this run");
            return;
        }
        if let Some(handle) = state.pending_reset.take() {
            handle.abort();
        }

        let repo = Arc::clone(&self.repo);
        let owner = owner.clone();
        let delay = self.reset_delay;
        let completed = completed.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match repo.reset_completed_goal(&owner, &completed).await {
                Ok(true) => info!("Weekly goal reset after completion"),
                Ok(false) => debug!("Goal changed before reset fired; skipping"),
                Err(e) => warn!("Failed to reset weekly goal: {}", e),
            }
        });

        debug!(delay_ms = delay.as_millis() as u64, "Scheduled goal reset");
        state.pending_reset = Some(handle);
        state.scheduled_for = Some(key);
    }
}
