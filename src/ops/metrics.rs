use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::day::Day;
use crate::model::project::Project;

/// Per-weekday success-rate averages, Monday first.
/// Weekdays with no observed days average to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeekdayAverages {
    averages: [f64; 7],
    observations: [usize; 7],
}

impl WeekdayAverages {
    pub fn get(&self, weekday: Weekday) -> f64 {
        self.averages[weekday.num_days_from_monday() as usize]
    }

    pub fn observations(&self, weekday: Weekday) -> usize {
        self.observations[weekday.num_days_from_monday() as usize]
    }

    /// The weekday with the highest average, or `None` when no day was
    /// observed at all. Ties break toward the earliest weekday in a single
    /// Monday-to-Sunday scan.
    pub fn most_productive(&self) -> Option<Weekday> {
        if self.observations.iter().all(|&n| n == 0) {
            return None;
        }
        const WEEK: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        let mut best = 0usize;
        for (idx, avg) in self.averages.iter().enumerate() {
            if *avg > self.averages[best] {
                best = idx;
            }
        }
        Some(WEEK[best])
    }
}

/// A day's success rate in [0, 100].
///
/// Scored tasks (done, not-done, pending) contribute the progress they earned
/// within the day over their scoring weight; dilated and not-applicable tasks
/// are left out of both sums. A day with no scorable weight rates zero.
/// Clamped, since completion is not forced to be monotonic within a day.
pub fn day_success_rate(day: &Day) -> f64 {
    let mut earned = 0.0;
    let mut weight = 0.0;
    for task in day.tasks() {
        if !task.state.is_scored() {
            continue;
        }
        earned += task.earned();
        weight += task.total_completion;
    }
    if weight > 0.0 {
        (earned / weight * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Recompute and store a day's cached success rate
pub fn refresh_day_sr(day: &mut Day) -> f64 {
    day.sr = day_success_rate(day);
    day.sr
}

/// A project's overall success rate: the mean day success rate across its
/// history, leaving out days that are still upcoming and, when `skip_empty`,
/// days that never got a task. Zero when no day is eligible.
pub fn project_osr(project: &Project, today: NaiveDate, skip_empty: bool) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for (date, day) in &project.days {
        if *date > today {
            continue;
        }
        if skip_empty && day.is_empty() {
            continue;
        }
        total += day_success_rate(day);
        count += 1;
    }
    if count > 0 { total / count as f64 } else { 0.0 }
}

/// Recompute and store a project's cached overall success rate.
/// Empty days are skipped, matching what the history view reports.
pub fn refresh_project_osr(project: &mut Project, today: NaiveDate) -> f64 {
    project.osr = project_osr(project, today, true);
    project.osr
}

/// Average success rate per weekday over every non-upcoming day of every
/// project
pub fn weekly_aggregates(projects: &[&Project], today: NaiveDate) -> WeekdayAverages {
    let mut sums = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for project in projects {
        for (date, day) in &project.days {
            if *date > today {
                continue;
            }
            let idx = date.weekday().num_days_from_monday() as usize;
            sums[idx] += day_success_rate(day);
            counts[idx] += 1;
        }
    }
    let mut averages = [0.0f64; 7];
    for idx in 0..7 {
        if counts[idx] > 0 {
            averages[idx] = sums[idx] / counts[idx] as f64;
        }
    }
    WeekdayAverages {
        averages,
        observations: counts,
    }
}

/// The weekday with the best average success rate across all projects,
/// or `None` when there is no history yet
pub fn most_productive_day(projects: &[&Project], today: NaiveDate) -> Option<Weekday> {
    weekly_aggregates(projects, today).most_productive()
}
