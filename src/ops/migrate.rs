use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::model::config::EngineConfig;
use crate::model::day::Day;
use crate::model::project::Project;
use crate::model::task::TaskId;
use crate::ops::rollover::ensure_working_day;
use crate::ops::{EngineError, StateError};

/// Move every queued carry-over task into the next working day.
///
/// The pending queue drains first, then the dilate queue. Each task is
/// re-parented under a category of the target day matching its previous
/// category name case-insensitively (created if absent) — moved, never
/// duplicated. The carried completion becomes the new baseline, and the
/// task's scoring weight drops to 1 − baseline/100: a recurring unfinished
/// task counts for proportionally less of the next day's score, since it
/// already earned partial credit.
///
/// Postcondition: both queues are empty. A queued id that no longer resolves
/// to a task is logged and dropped. Emptied source days are kept; history is
/// never pruned.
pub fn migrate_queues<'a>(
    project: &'a mut Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
) -> Result<&'a Day, EngineError> {
    let target_date = ensure_working_day(project, now, config)?.date;

    let queued: Vec<TaskId> = project
        .pending_queue
        .drain(..)
        .chain(project.dilate_queue.drain(..))
        .collect();

    let mut moved = 0usize;
    for id in queued {
        let Some(location) = project.locate_task(id) else {
            warn!(task = %id, "queued task no longer exists; dropping");
            continue;
        };
        if location.date == target_date {
            continue; // already living on the target day
        }
        let Some(mut task) = project
            .day_mut(location.date)
            .and_then(|day| day.take_task(id))
        else {
            continue;
        };

        task.created_on = target_date;
        task.initial_completion = task.completion;
        task.total_completion = 1.0 - task.initial_completion / 100.0;
        task.migrated = true;

        let target = project
            .day_mut(target_date)
            .ok_or(StateError::UnknownDay(target_date))?;
        target.ensure_category(&location.category).tasks.push(task);
        moved += 1;
    }

    debug!(project = %project.name, date = %target_date, moved, "queues migrated");
    project
        .day(target_date)
        .ok_or_else(|| StateError::UnknownDay(target_date).into())
}
