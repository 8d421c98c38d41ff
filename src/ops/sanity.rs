use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::debug;

use crate::model::config::EngineConfig;
use crate::model::project::Project;
use crate::model::task::{Task, TaskId, TaskState};
use crate::ops::status::{Status, project_status};
use crate::time::TimeOfDay;

/// Structured result from a day-close reconciliation pass,
/// suitable for --json output.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SanityReport {
    /// The pass ran (the day-close gate was satisfied)
    pub ran: bool,
    /// Tasks that made no progress and were marked not-done
    pub marked_not_done: usize,
    /// Pending tasks with progress, queued for carry-over
    pub queued_pending: usize,
    /// Dilated tasks queued for carry-over
    pub queued_dilate: usize,
}

/// Reconcile every task of every non-upcoming day at day-close.
///
/// Runs only when the project is closed and the time of day is not before the
/// project's starting time, i.e. in the closed stretch after the accepting
/// cutoff. Days dated after today were prepared in advance and are untouched.
///
/// Per task:
/// - pending with no progress (completion 0, or equal to its baseline) is
///   marked not-done;
/// - pending with progress has its baseline frozen to the current completion
///   and joins the pending queue;
/// - dilated tasks have their baseline frozen and join the dilate queue.
///
/// Safe to re-invoke: a task already queued is skipped, and a task marked
/// not-done no longer matches any rule.
pub fn run_day_close_checks(
    project: &mut Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
) -> SanityReport {
    let mut report = SanityReport::default();
    let status = project_status(project, now, config);
    if status != Status::Closed {
        return report;
    }
    if TimeOfDay::from_instant(now) < project.starting_time {
        return report;
    }
    report.ran = true;

    let today = now.date_naive();
    // queues are taken out so tasks can be visited mutably while enqueueing
    let mut pending_queue = std::mem::take(&mut project.pending_queue);
    let mut dilate_queue = std::mem::take(&mut project.dilate_queue);

    for (date, day) in project.days.iter_mut() {
        if *date > today {
            continue; // prepared in advance
        }
        for task in day.tasks_mut() {
            reconcile(task, &mut pending_queue, &mut dilate_queue, &mut report);
        }
    }

    project.pending_queue = pending_queue;
    project.dilate_queue = dilate_queue;
    debug!(
        project = %project.name,
        not_done = report.marked_not_done,
        pending = report.queued_pending,
        dilate = report.queued_dilate,
        "day-close reconciliation"
    );
    report
}

/// Apply the day-close rules to one task
fn reconcile(
    task: &mut Task,
    pending_queue: &mut Vec<TaskId>,
    dilate_queue: &mut Vec<TaskId>,
    report: &mut SanityReport,
) {
    // already carried over by an earlier pass
    if pending_queue.contains(&task.id) || dilate_queue.contains(&task.id) {
        return;
    }
    match task.state {
        TaskState::Pending
            if task.completion == 0.0 || task.completion == task.initial_completion =>
        {
            task.state = TaskState::NotDone;
            report.marked_not_done += 1;
        }
        TaskState::Pending => {
            task.initial_completion = task.completion;
            pending_queue.push(task.id);
            report.queued_pending += 1;
        }
        TaskState::Dilate => {
            task.initial_completion = task.completion;
            dilate_queue.push(task.id);
            report.queued_dilate += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    use crate::ops::task_ops::{add_task, set_completion, set_task_state};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(y: i32, m: u32, day: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, day, hour, min, 0)
            .unwrap()
    }

    /// Accepting cutoff at 22:00 so a closed stretch exists at the end of the
    /// day, which is when reconciliation runs
    fn config() -> EngineConfig {
        toml::from_str("accepting_tasks_max_time = 2200").unwrap()
    }

    fn t(hhmm: u16) -> TimeOfDay {
        TimeOfDay::from_hhmm(hhmm).unwrap()
    }

    /// Created 2026-03-02, window 09:00–17:00; one first-day task per call
    fn project_with_tasks(specs: &[(&str, TaskState, f64, f64)]) -> (Project, Vec<TaskId>) {
        let mut project = Project::new("alpha", d(2026, 3, 2), t(900), t(1700), 30).unwrap();
        let noon = at(2026, 3, 2, 12, 0);
        let mut ids = Vec::new();
        for (name, state, completion, initial) in specs {
            let id = add_task(&mut project, noon, &config(), "Core", name, None).unwrap();
            if *completion > 0.0 {
                set_completion(&mut project, id, *completion).unwrap();
            }
            if *state == TaskState::Dilate {
                set_task_state(&mut project, noon, &config(), id, TaskState::Dilate).unwrap();
            }
            project.find_task_mut(id).unwrap().initial_completion = *initial;
            ids.push(id);
        }
        (project, ids)
    }

    /// 22:30 on the creation day is still first-day, so close on the evening
    /// of the next calendar day
    fn close_time() -> DateTime<FixedOffset> {
        at(2026, 3, 3, 22, 30)
    }

    #[test]
    fn test_no_progress_pending_marked_not_done() {
        // scenario: pending, completion 0, baseline 0 -> not-done, not queued
        let (mut project, ids) = project_with_tasks(&[("t", TaskState::Pending, 0.0, 0.0)]);
        let report = run_day_close_checks(&mut project, close_time(), &config());
        assert!(report.ran);
        assert_eq!(report.marked_not_done, 1);
        assert_eq!(project.find_task(ids[0]).unwrap().state, TaskState::NotDone);
        assert!(project.pending_queue.is_empty());
    }

    #[test]
    fn test_stalled_pending_marked_not_done() {
        // completion equal to the baseline counts as no progress
        let (mut project, ids) = project_with_tasks(&[("t", TaskState::Pending, 40.0, 40.0)]);
        run_day_close_checks(&mut project, close_time(), &config());
        assert_eq!(project.find_task(ids[0]).unwrap().state, TaskState::NotDone);
    }

    #[test]
    fn test_progressed_pending_queued() {
        // scenario: pending, completion 40, baseline 0 -> stays pending,
        // baseline frozen to 40, queued
        let (mut project, ids) = project_with_tasks(&[("t", TaskState::Pending, 40.0, 0.0)]);
        let report = run_day_close_checks(&mut project, close_time(), &config());
        assert_eq!(report.queued_pending, 1);
        let task = project.find_task(ids[0]).unwrap();
        assert_eq!(task.state, TaskState::Pending);
        assert_eq!(task.initial_completion, 40.0);
        assert_eq!(project.pending_queue, vec![ids[0]]);
    }

    #[test]
    fn test_dilated_task_queued() {
        // scenario: dilate, completion 10, baseline 0 -> baseline frozen to
        // 10, dilate queue, state unchanged
        let (mut project, ids) = project_with_tasks(&[("t", TaskState::Dilate, 10.0, 0.0)]);
        let report = run_day_close_checks(&mut project, close_time(), &config());
        assert_eq!(report.queued_dilate, 1);
        let task = project.find_task(ids[0]).unwrap();
        assert_eq!(task.state, TaskState::Dilate);
        assert_eq!(task.initial_completion, 10.0);
        assert_eq!(project.dilate_queue, vec![ids[0]]);
    }

    #[test]
    fn test_terminal_tasks_untouched() {
        let (mut project, ids) =
            project_with_tasks(&[("a", TaskState::Pending, 0.0, 0.0), ("b", TaskState::Pending, 0.0, 0.0)]);
        set_task_state(&mut project, at(2026, 3, 2, 13, 0), &config(), ids[1], TaskState::Done)
            .unwrap();
        run_day_close_checks(&mut project, close_time(), &config());
        assert_eq!(project.find_task(ids[1]).unwrap().state, TaskState::Done);
    }

    #[test]
    fn test_idempotent_re_invocation() {
        let (mut project, ids) = project_with_tasks(&[
            ("gone", TaskState::Pending, 0.0, 0.0),
            ("carried", TaskState::Pending, 40.0, 0.0),
            ("dilated", TaskState::Dilate, 10.0, 0.0),
        ]);
        let first = run_day_close_checks(&mut project, close_time(), &config());
        assert_eq!((first.marked_not_done, first.queued_pending, first.queued_dilate), (1, 1, 1));

        let second = run_day_close_checks(&mut project, close_time(), &config());
        assert!(second.ran);
        assert_eq!((second.marked_not_done, second.queued_pending, second.queued_dilate), (0, 0, 0));
        assert_eq!(project.find_task(ids[0]).unwrap().state, TaskState::NotDone);
        assert_eq!(project.pending_queue, vec![ids[1]]);
        assert_eq!(project.dilate_queue, vec![ids[2]]);
        // the carried task's baseline froze once and stayed put
        assert_eq!(project.find_task(ids[1]).unwrap().initial_completion, 40.0);
    }

    #[test]
    fn test_gate_requires_closed_status() {
        let (mut project, ids) = project_with_tasks(&[("t", TaskState::Pending, 0.0, 0.0)]);
        // mid-window: open, not closed
        let report = run_day_close_checks(&mut project, at(2026, 3, 3, 12, 0), &config());
        assert!(!report.ran);
        assert_eq!(project.find_task(ids[0]).unwrap().state, TaskState::Pending);
    }

    #[test]
    fn test_gate_requires_time_past_opening() {
        // early morning is closed but before the opening window: no pass
        let (mut project, ids) = project_with_tasks(&[("t", TaskState::Pending, 0.0, 0.0)]);
        let report = run_day_close_checks(&mut project, at(2026, 3, 3, 7, 0), &config());
        assert!(!report.ran);
        assert_eq!(project.find_task(ids[0]).unwrap().state, TaskState::Pending);
    }

    #[test]
    fn test_upcoming_days_untouched() {
        let (mut project, _) = project_with_tasks(&[("t", TaskState::Pending, 40.0, 0.0)]);
        // task added while accepting on Mar 3 lands on Mar 4
        let id = add_task(
            &mut project,
            at(2026, 3, 3, 18, 0),
            &config(),
            "Core",
            "tomorrow task",
            None,
        )
        .unwrap();
        run_day_close_checks(&mut project, close_time(), &config());
        let task = project.find_task(id).unwrap();
        assert_eq!(task.state, TaskState::Pending);
        assert!(!project.pending_queue.contains(&id));
    }
}
