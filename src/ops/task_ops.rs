use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::model::config::EngineConfig;
use crate::model::project::{Project, ValidationError};
use crate::model::task::{Task, TaskId, TaskState};
use crate::ops::rollover::ensure_working_day;
use crate::ops::status::{Status, project_status};
use crate::ops::{EngineError, StateError};

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Whether a direct transition is legal.
///
/// Not-done is never a legal direct target; only day-close reconciliation
/// produces it. Un-dilating is only allowed while the owning day is still
/// upcoming and the project is accepting tasks.
fn transition_allowed(
    from: TaskState,
    to: TaskState,
    day_is_upcoming: bool,
    status: Status,
) -> bool {
    match (from, to) {
        (TaskState::Pending, TaskState::Done)
        | (TaskState::Pending, TaskState::NotApplicable)
        | (TaskState::Pending, TaskState::Dilate)
        | (TaskState::Pending, TaskState::Verify) => true,
        (TaskState::Dilate, TaskState::Pending) => {
            day_is_upcoming && status == Status::AcceptingTasks
        }
        (TaskState::Verify, TaskState::Verified)
        | (TaskState::Verify, TaskState::NotVerified) => true,
        _ => false,
    }
}

/// Apply a state transition to a task, enforcing the lifecycle rules.
/// An illegal transition leaves the task untouched.
pub fn set_task_state(
    project: &mut Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
    id: TaskId,
    to: TaskState,
) -> Result<(), EngineError> {
    let status = project_status(project, now, config);
    let today = now.date_naive();
    let location = project
        .locate_task(id)
        .ok_or(StateError::UnknownTask(id))?;
    let day_is_upcoming = location.date > today;

    let task = project
        .find_task_mut(id)
        .ok_or(StateError::UnknownTask(id))?;
    let from = task.state;
    if from == to {
        return Ok(());
    }
    if !transition_allowed(from, to, day_is_upcoming, status) {
        return Err(StateError::IllegalTransition { from, to }.into());
    }
    task.state = to;
    if to == TaskState::Done {
        task.completion = 100.0;
    }
    debug!(task = %id, %from, %to, "task transition");
    Ok(())
}

/// Record progress on a task. Rejects values outside [0, 100].
pub fn set_completion(
    project: &mut Project,
    id: TaskId,
    completion: f64,
) -> Result<(), EngineError> {
    if !(0.0..=100.0).contains(&completion) {
        return Err(ValidationError::CompletionOutOfRange(completion).into());
    }
    let task = project
        .find_task_mut(id)
        .ok_or(StateError::UnknownTask(id))?;
    task.completion = completion;
    Ok(())
}

/// Update a task's note
pub fn set_note(
    project: &mut Project,
    id: TaskId,
    note: Option<String>,
) -> Result<(), EngineError> {
    let task = project
        .find_task_mut(id)
        .ok_or(StateError::UnknownTask(id))?;
    task.note = note.filter(|n| !n.trim().is_empty());
    Ok(())
}

// ---------------------------------------------------------------------------
// Task creation
// ---------------------------------------------------------------------------

/// Add a task under a category of the current working day.
///
/// Only allowed while the project can take tasks: on the first day the task
/// lands on today's day; while accepting it lands on tomorrow's. The project
/// category template and the per-day category are created on demand.
pub fn add_task(
    project: &mut Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
    category: &str,
    name: &str,
    note: Option<String>,
) -> Result<TaskId, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::BlankName.into());
    }
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::BlankName.into());
    }
    let status = project_status(project, now, config);
    if !matches!(status, Status::FirstDay | Status::AcceptingTasks) {
        return Err(StateError::NotAcceptingTasks { status }.into());
    }

    project.ensure_category(category);
    let id = project.allocate_task_id();
    let mut task = Task::new(id, name, now.date_naive());
    task.note = note.filter(|n| !n.trim().is_empty());

    let day = ensure_working_day(project, now, config)?;
    day.ensure_category(category).tasks.push(task);
    debug!(project = %project.name, task = %id, category, "task added");
    Ok(id)
}

/// Promote a bucket entry into a real task.
///
/// Goes through the same gated add path; the entry is only removed once the
/// task has landed, so a rejected add leaves the bucket untouched.
pub fn promote_bucket_entry(
    project: &mut Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
    entry_id: u64,
    category: &str,
) -> Result<TaskId, EngineError> {
    let name = project
        .bucket_entry(entry_id)
        .ok_or(StateError::UnknownBucketEntry(entry_id))?
        .name
        .clone();
    let task_id = add_task(project, now, config, category, &name, None)?;
    project.remove_bucket_entry(entry_id);
    Ok(task_id)
}
