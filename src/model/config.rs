use serde::{Deserialize, Serialize};

use crate::time::TimeOfDay;

/// Engine configuration, from config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Earliest time of day at which a working day can begin
    #[serde(default = "default_working_day_start")]
    pub working_day_start: TimeOfDay,
    /// Latest time of day at which tasks may still be added
    #[serde(default = "default_accepting_tasks_max_time")]
    pub accepting_tasks_max_time: TimeOfDay,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            working_day_start: default_working_day_start(),
            accepting_tasks_max_time: default_accepting_tasks_max_time(),
        }
    }
}

fn default_working_day_start() -> TimeOfDay {
    TimeOfDay::MIDNIGHT
}

fn default_accepting_tasks_max_time() -> TimeOfDay {
    TimeOfDay::LAST_MINUTE
}
