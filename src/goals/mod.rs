//! Weekly journaling goals.
//!
//! Each user has a single mutable goal document (`weeklygoal/current`) and an
//! append-only history of completed goals. [`tracker::WeeklyGoalTracker`]
//! drives the document through its states; the types here are plain data.

pub mod tracker;

use crate::constants::{MAX_TARGET_DAYS, MIN_TARGET_DAYS};
use crate::errors::GoalError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use tracker::{GoalTransition, RejectReason, WeeklyGoalTracker};

/// Where a goal document is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalState {
    /// Blank goal text: nothing chosen yet, or cleared after completion.
    NoGoal,
    InProgress,
    Completed,
}

/// The per-user current goal document.
///
/// # Examples
///
/// ```
/// use sentio::goals::{GoalState, WeeklyGoal};
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let goal = WeeklyGoal::new(WeeklyGoal::default_text(3), 3, today).unwrap();
/// assert_eq!(goal.goal, "Write a journal 3 times this week");
/// assert_eq!(goal.state(), GoalState::InProgress);
///
/// assert!(WeeklyGoal::new("too much", 8, today).is_err());
/// assert_eq!(WeeklyGoal::default().state(), GoalState::NoGoal);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoal {
    pub goal: String,
    pub target_days: u32,
    /// Never exceeds `target_days`.
    pub days_completed: u32,
    /// `days_completed >= target_days` once a goal has been set.
    pub is_done: bool,
    pub start_date: Option<NaiveDate>,
    pub total_goals_completed: i64,
}

impl WeeklyGoal {
    /// A fresh goal starting on `today`.
    pub fn new(goal: impl Into<String>, target_days: u32, today: NaiveDate) -> Result<Self, GoalError> {
        if !(MIN_TARGET_DAYS..=MAX_TARGET_DAYS).contains(&target_days) {
            return Err(GoalError::InvalidTarget(target_days));
        }
        Ok(WeeklyGoal {
            goal: goal.into(),
            target_days,
            days_completed: 0,
            is_done: false,
            start_date: Some(today),
            total_goals_completed: 0,
        })
    }

    /// Goal text offered by the goal picker.
    pub fn default_text(target_days: u32) -> String {
        format!("Write a journal {} times this week", target_days)
    }

    pub fn state(&self) -> GoalState {
        if self.goal.trim().is_empty() {
            GoalState::NoGoal
        } else if self.is_done {
            GoalState::Completed
        } else {
            GoalState::InProgress
        }
    }

    /// Progress after one more completed day, clamped at the target.
    pub fn next_progress(&self) -> (u32, bool) {
        let days = (self.days_completed + 1).min(self.target_days);
        (days, days >= self.target_days)
    }

    /// Identifies one particular goal run, so a completion is only acted on once.
    pub(crate) fn run_key(&self) -> (String, u32, Option<NaiveDate>) {
        (self.goal.clone(), self.target_days, self.start_date)
    }
}

/// Archived record of a finished goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalHistoryEntry {
    pub goal: String,
    pub target_days: u32,
    pub days_completed: u32,
    pub completed_at: NaiveDate,
}

impl GoalHistoryEntry {
    pub fn is_complete(&self) -> bool {
        self.target_days > 0 && self.days_completed >= self.target_days
    }
}

/// Number of history entries that represent a reached target.
pub fn goals_completed(history: &[GoalHistoryEntry]) -> usize {
    history.iter().filter(|entry| entry.is_complete()).count()
}
