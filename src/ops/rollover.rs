use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::model::config::EngineConfig;
use crate::model::day::Day;
use crate::model::project::Project;
use crate::ops::status::{Status, project_status};
use crate::ops::{EngineError, StateError};

/// Return the working day that new or migrated tasks should land on,
/// creating it if it does not exist yet.
///
/// On the project's first day the target is today; otherwise it is tomorrow.
/// Idempotent by calendar date: calling this twice yields exactly one day for
/// the target date, and an existing day is returned unchanged.
pub fn ensure_working_day<'a>(
    project: &'a mut Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
) -> Result<&'a mut Day, EngineError> {
    let status = project_status(project, now, config);
    let today = now.date_naive();
    let target = if status == Status::FirstDay {
        today
    } else {
        today.succ_opt().ok_or(StateError::NoRolloverTarget)?
    };

    if !project.days.contains_key(&target) {
        debug!(project = %project.name, date = %target, "creating working day");
    }
    let gmt_offset = now.offset().local_minus_utc();
    Ok(project
        .days
        .entry(target)
        .or_insert_with(|| Day::new(target, gmt_offset)))
}

/// Replace the stored day with the same calendar date.
///
/// Fails with `UnknownDay` if no day exists for that date. This is a plain
/// keyed update; rollover remains the only way a new date enters the history.
pub fn update_day(project: &mut Project, day: Day) -> Result<(), EngineError> {
    match project.days.get_mut(&day.date) {
        Some(slot) => {
            *slot = day;
            Ok(())
        }
        None => Err(StateError::UnknownDay(day.date).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    use crate::model::task::{Task, TaskId};
    use crate::time::TimeOfDay;

    fn t(hhmm: u16) -> TimeOfDay {
        TimeOfDay::from_hhmm(hhmm).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(y: i32, m: u32, day: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(y, m, day, hour, min, 0)
            .unwrap()
    }

    fn sample_project() -> Project {
        Project::new("alpha", d(2026, 3, 2), t(900), t(1700), 30).unwrap()
    }

    #[test]
    fn test_first_day_targets_today() {
        let mut project = sample_project();
        let now = at(2026, 3, 2, 14, 0);
        let day = ensure_working_day(&mut project, now, &EngineConfig::default()).unwrap();
        assert_eq!(day.date, d(2026, 3, 2));
        assert_eq!(day.gmt_offset, 3600);
    }

    #[test]
    fn test_later_days_target_tomorrow() {
        let mut project = sample_project();
        let now = at(2026, 3, 5, 18, 0); // accepting
        let day = ensure_working_day(&mut project, now, &EngineConfig::default()).unwrap();
        assert_eq!(day.date, d(2026, 3, 6));
    }

    #[test]
    fn test_idempotent_by_calendar_date() {
        let mut project = sample_project();
        let now = at(2026, 3, 5, 18, 0);
        let config = EngineConfig::default();

        ensure_working_day(&mut project, now, &config).unwrap();
        // mutate the created day, then ensure again: the existing day must be
        // returned unchanged, not replaced
        let date = d(2026, 3, 6);
        project
            .day_mut(date)
            .unwrap()
            .ensure_category("Core")
            .tasks
            .push(Task::new(TaskId(1), "t", date));

        let day = ensure_working_day(&mut project, now, &config).unwrap();
        assert_eq!(day.task_count(), 1);
        assert_eq!(project.days.len(), 1);
    }

    #[test]
    fn test_update_day_replaces_matching_date() {
        let mut project = sample_project();
        let now = at(2026, 3, 5, 18, 0);
        let config = EngineConfig::default();
        let date = ensure_working_day(&mut project, now, &config).unwrap().date;

        let mut replacement = Day::new(date, 0);
        replacement.sr = 62.5;
        update_day(&mut project, replacement).unwrap();
        assert_eq!(project.day(date).unwrap().sr, 62.5);
    }

    #[test]
    fn test_update_day_unknown_date_fails() {
        let mut project = sample_project();
        let day = Day::new(d(2026, 4, 1), 0);
        let err = update_day(&mut project, day).unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::UnknownDay(_))));
        assert!(project.days.is_empty());
    }
}
