use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Done,
    NotDone,
    NotApplicable,
    Dilate,
    Verify,
    Verified,
    NotVerified,
}

impl TaskState {
    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Done | TaskState::NotApplicable | TaskState::Verified | TaskState::NotVerified
        )
    }

    /// Whether a task in this state contributes to a day's success rate.
    /// Dilated tasks are scored on the day they land on after migration;
    /// not-applicable and verification tasks are never scored.
    pub fn is_scored(self) -> bool {
        matches!(self, TaskState::Done | TaskState::NotDone | TaskState::Pending)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Done => "done",
            TaskState::NotDone => "not-done",
            TaskState::NotApplicable => "not-applicable",
            TaskState::Dilate => "dilate",
            TaskState::Verify => "verify",
            TaskState::Verified => "verified",
            TaskState::NotVerified => "not-verified",
        };
        write!(f, "{}", s)
    }
}

/// Identifier for a task, unique within its project.
/// Queue membership references tasks by id; the owning category holds the task
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A task owned by exactly one category of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
    pub state: TaskState,
    /// Completion percentage in [0, 100]
    pub completion: f64,
    /// Baseline snapshot the day's progress is measured against.
    /// Frozen to the carried completion when a task migrates.
    pub initial_completion: f64,
    /// Scoring weight for the owning day. 1.0 for a fresh task; a carried-over
    /// task weighs 1 − initial/100, since it already earned partial credit.
    pub total_completion: f64,
    #[serde(default)]
    pub migrated: bool,
    pub created_on: NaiveDate,
}

impl Task {
    /// Create a fresh pending task
    pub fn new(id: TaskId, name: impl Into<String>, created_on: NaiveDate) -> Task {
        Task {
            id,
            name: name.into(),
            note: None,
            state: TaskState::Pending,
            completion: 0.0,
            initial_completion: 0.0,
            total_completion: 1.0,
            migrated: false,
            created_on,
        }
    }

    /// Progress earned within the owning day, as a fraction of one task
    pub fn earned(&self) -> f64 {
        (self.completion - self.initial_completion).abs() / 100.0
    }
}
