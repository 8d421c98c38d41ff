use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::config::EngineConfig;
use crate::model::project::Project;
use crate::time::TimeOfDay;

/// A project's temporal status at some instant.
///
/// Drives what the rest of the engine may do: whether tasks can be added and
/// where they land, whether rollover targets today or tomorrow, and whether
/// day-close reconciliation may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The project's creation day: tasks can be added for today itself,
    /// regardless of the configured starting time
    FirstDay,
    /// Inside the working window
    Open,
    /// Past closing time: tasks can be added for tomorrow
    AcceptingTasks,
    /// Outside every window
    Closed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::FirstDay => "first-day",
            Status::Open => "open",
            Status::AcceptingTasks => "accepting-tasks",
            Status::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// Classify a project's status at the given instant.
///
/// Pure and deterministic. Rules are checked in order; the first match wins:
/// 1. First day: now is the creation date and the time of day falls within
///    [working_day_start, accepting_tasks_max_time]. Overrides everything so a
///    brand-new project can accept tasks for "today" once.
/// 2. Accepting: time of day within [closing_time, accepting_tasks_max_time].
/// 3. Open: time of day within [starting_time, closing_time + tolerance].
/// 4. Closed otherwise.
pub fn project_status(
    project: &Project,
    now: DateTime<FixedOffset>,
    config: &EngineConfig,
) -> Status {
    let today = now.date_naive();
    let now_t = TimeOfDay::from_instant(now);

    if today == project.created_on
        && config.working_day_start <= now_t
        && now_t <= config.accepting_tasks_max_time
    {
        return Status::FirstDay;
    }
    if project.closing_time <= now_t && now_t <= config.accepting_tasks_max_time {
        return Status::AcceptingTasks;
    }
    let close_with_tolerance = project.closing_time.plus_minutes(project.closing_tolerance_min);
    if project.starting_time <= now_t && now_t <= close_with_tolerance {
        return Status::Open;
    }
    Status::Closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn t(hhmm: u16) -> TimeOfDay {
        TimeOfDay::from_hhmm(hhmm).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, hour, min, 0)
            .unwrap()
    }

    /// Created 2026-03-02, window 09:00–17:00, 30 min tolerance
    fn sample_project() -> Project {
        Project::new(
            "alpha",
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            t(900),
            t(1700),
            30,
        )
        .unwrap()
    }

    #[test]
    fn test_first_day_overrides_open() {
        // mid-window on the creation day is still first-day, not open
        let project = sample_project();
        let status = project_status(&project, at(2026, 3, 2, 14, 0), &EngineConfig::default());
        assert_eq!(status, Status::FirstDay);
    }

    #[test]
    fn test_first_day_only_on_creation_date() {
        // the day after creation never reports first-day again; any other
        // date classifies purely by time windows
        let project = sample_project();
        let config = EngineConfig::default();
        assert_eq!(project_status(&project, at(2026, 3, 3, 14, 0), &config), Status::Open);
        assert_eq!(project_status(&project, at(2026, 3, 1, 14, 0), &config), Status::Open);
    }

    #[test]
    fn test_first_day_respects_working_day_bounds() {
        let project = sample_project();
        let config: EngineConfig = toml::from_str(
            "working_day_start = 600\naccepting_tasks_max_time = 2200",
        )
        .unwrap();
        assert_eq!(
            project_status(&project, at(2026, 3, 2, 5, 0), &config),
            Status::Closed
        );
        assert_eq!(
            project_status(&project, at(2026, 3, 2, 6, 0), &config),
            Status::FirstDay
        );
        // past the accepting cutoff even on the first day
        assert_eq!(
            project_status(&project, at(2026, 3, 2, 22, 30), &config),
            Status::Closed
        );
    }

    #[test]
    fn test_open_window() {
        let project = sample_project();
        let config = EngineConfig::default();
        assert_eq!(project_status(&project, at(2026, 3, 3, 9, 0), &config), Status::Open);
        assert_eq!(project_status(&project, at(2026, 3, 3, 16, 59), &config), Status::Open);
    }

    #[test]
    fn test_accepting_wins_from_closing_time() {
        // the accepting rule is checked before the open rule, so from closing
        // time onward the tolerance never comes into play under the default
        // accepting cutoff
        let project = sample_project();
        let config = EngineConfig::default();
        assert_eq!(
            project_status(&project, at(2026, 3, 3, 17, 0), &config),
            Status::AcceptingTasks
        );
        assert_eq!(
            project_status(&project, at(2026, 3, 3, 17, 15), &config),
            Status::AcceptingTasks
        );
        assert_eq!(
            project_status(&project, at(2026, 3, 3, 23, 59), &config),
            Status::AcceptingTasks
        );
    }

    #[test]
    fn test_tolerance_extends_open_past_accepting_cutoff() {
        // with an early accepting cutoff, the tolerance window is reachable
        let mut project = sample_project();
        project.closing_time = t(2230);
        project.closing_tolerance_min = 45;
        let config: EngineConfig =
            toml::from_str("accepting_tasks_max_time = 2200").unwrap();
        assert_eq!(
            project_status(&project, at(2026, 3, 3, 22, 45), &config),
            Status::Open
        );
        assert_eq!(
            project_status(&project, at(2026, 3, 3, 23, 30), &config),
            Status::Closed
        );
    }

    #[test]
    fn test_closed_before_start() {
        let project = sample_project();
        let config = EngineConfig::default();
        assert_eq!(project_status(&project, at(2026, 3, 3, 8, 59), &config), Status::Closed);
        assert_eq!(project_status(&project, at(2026, 3, 3, 0, 0), &config), Status::Closed);
    }

    #[test]
    fn test_late_night_close_with_early_cutoff() {
        // accepting cutoff at 22:00 leaves a closed stretch at the end of the
        // day, which is when day-close reconciliation runs
        let project = sample_project();
        let config: EngineConfig =
            toml::from_str("accepting_tasks_max_time = 2200").unwrap();
        assert_eq!(
            project_status(&project, at(2026, 3, 3, 22, 1), &config),
            Status::Closed
        );
    }
}
