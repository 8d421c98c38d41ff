//! Working-day task tracking: projects with a daily time window, carry-over
//! queues for unfinished work, and per-day/per-project completion metrics.
//!
//! The engine is purely computational: every operation takes the project
//! graph and the current instant as arguments and mutates in memory. Drivers
//! fetch a project once, run a batch of operations, and persist once.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod time;

pub use io::repository::{JsonRepository, Repository, RepositoryError};
pub use model::config::EngineConfig;
pub use model::day::{Category, Day};
pub use model::project::{BucketEntry, Project, TaskLocation, ValidationError};
pub use model::task::{Task, TaskId, TaskState};
pub use ops::metrics::{
    WeekdayAverages, day_success_rate, most_productive_day, project_osr, refresh_day_sr,
    refresh_project_osr, weekly_aggregates,
};
pub use ops::migrate::migrate_queues;
pub use ops::rollover::{ensure_working_day, update_day};
pub use ops::sanity::{SanityReport, run_day_close_checks};
pub use ops::status::{Status, project_status};
pub use ops::task_ops::{
    add_task, promote_bucket_entry, set_completion, set_note, set_task_state,
};
pub use ops::{EngineError, StateError};
pub use time::{Clock, FixedClock, SystemClock, TimeOfDay};
