pub mod metrics;
pub mod migrate;
pub mod rollover;
pub mod sanity;
pub mod status;
pub mod task_ops;

use chrono::NaiveDate;

use crate::model::project::ValidationError;
use crate::model::task::{TaskId, TaskState};
use self::status::Status;

/// Error type for operations rejected by lifecycle rules.
/// The operation is a no-op; nothing is partially applied.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateError {
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition { from: TaskState, to: TaskState },
    #[error("project is not accepting tasks (status: {status})")]
    NotAcceptingTasks { status: Status },
    #[error("no day recorded for {0}")]
    UnknownDay(NaiveDate),
    #[error("task not found: {0}")]
    UnknownTask(TaskId),
    #[error("bucket entry not found: {0}")]
    UnknownBucketEntry(u64),
    #[error("no rollover target: cannot compute the next calendar date")]
    NoRolloverTarget,
}

/// Umbrella error returned by the public operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
}
