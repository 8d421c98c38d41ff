use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::day::Day;
use super::task::{Task, TaskId};
use crate::time::TimeOfDay;

/// Error type for rejected model mutations.
/// A failed mutation is rejected whole; nothing is partially applied.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be blank")]
    BlankName,
    #[error("closing time {closing} is earlier than starting time {starting}")]
    OvernightWindow {
        starting: TimeOfDay,
        closing: TimeOfDay,
    },
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    #[error("completion percentage out of range: {0}")]
    CompletionOutOfRange(f64),
}

/// A free-form backlog item, not yet tied to a day or category.
/// Promoting an entry creates a task through the gated add-task path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketEntry {
    pub id: u64,
    pub name: String,
    pub priority: u8,
    pub created_on: NaiveDate,
}

/// Where a task currently lives: its owning day and category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    pub date: NaiveDate,
    pub category: String,
}

/// A time-boxed project: a daily working window over an append-only history
/// of days, plus the carry-over queues and the backlog bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub created_on: NaiveDate,
    pub starting_time: TimeOfDay,
    pub closing_time: TimeOfDay,
    /// Minutes past closing time during which the day still counts as open
    pub closing_tolerance_min: u16,
    #[serde(default)]
    pub notify_closing_time: bool,
    /// Cached overall success rate, refreshed by the metrics engine
    #[serde(default)]
    pub osr: f64,
    /// Project-level category templates, case-insensitive unique.
    /// Independent from the per-day category instances.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Days keyed by calendar date. Append-only: days are created by rollover
    /// and never deleted, so historical success rates stay computable.
    #[serde(default)]
    pub days: IndexMap<NaiveDate, Day>,
    /// Unfinished tasks awaiting carry-over into the next working day.
    /// Non-owning, ordered, deduplicated; the owning category keeps the task
    /// until migration re-parents it.
    #[serde(default)]
    pub pending_queue: Vec<TaskId>,
    /// Dilated tasks awaiting carry-over, drained after the pending queue
    #[serde(default)]
    pub dilate_queue: Vec<TaskId>,
    #[serde(default)]
    pub bucket: Vec<BucketEntry>,
    next_task_id: u64,
    next_entry_id: u64,
}

impl Project {
    /// Create a project with an empty history.
    ///
    /// Overnight windows (closing earlier than starting) are rejected here:
    /// the status classifier compares times within one calendar day and would
    /// misclassify a window that wraps midnight.
    pub fn new(
        name: impl Into<String>,
        created_on: NaiveDate,
        starting_time: TimeOfDay,
        closing_time: TimeOfDay,
        closing_tolerance_min: u16,
    ) -> Result<Project, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        if closing_time < starting_time {
            return Err(ValidationError::OvernightWindow {
                starting: starting_time,
                closing: closing_time,
            });
        }
        Ok(Project {
            name,
            created_on,
            starting_time,
            closing_time,
            closing_tolerance_min,
            notify_closing_time: false,
            osr: 0.0,
            categories: Vec::new(),
            days: IndexMap::new(),
            pending_queue: Vec::new(),
            dilate_queue: Vec::new(),
            bucket: Vec::new(),
            next_task_id: 1,
            next_entry_id: 1,
        })
    }

    // -- categories ---------------------------------------------------------

    /// Add a category template; duplicates (case-insensitive) are rejected
    pub fn add_category(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        if self.has_category(name) {
            return Err(ValidationError::DuplicateCategory(name.to_string()));
        }
        self.categories.push(name.to_string());
        Ok(())
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.to_lowercase() == name.to_lowercase())
    }

    /// Make sure a category template exists, keeping the first spelling seen
    pub fn ensure_category(&mut self, name: &str) {
        if !self.has_category(name) {
            self.categories.push(name.trim().to_string());
        }
    }

    // -- identity -----------------------------------------------------------

    pub fn allocate_task_id(&mut self) -> TaskId {
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        id
    }

    pub fn allocate_entry_id(&mut self) -> u64 {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        id
    }

    // -- days and tasks -----------------------------------------------------

    pub fn day(&self, date: NaiveDate) -> Option<&Day> {
        self.days.get(&date)
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> Option<&mut Day> {
        self.days.get_mut(&date)
    }

    /// Find the day and category currently owning a task
    pub fn locate_task(&self, id: TaskId) -> Option<TaskLocation> {
        for (date, day) in &self.days {
            if let Some(category) = day.category_of(id) {
                return Some(TaskLocation {
                    date: *date,
                    category: category.to_string(),
                });
            }
        }
        None
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.days.values().find_map(|day| day.find_task(id))
    }

    pub fn find_task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.days.values_mut().find_map(|day| day.find_task_mut(id))
    }

    // -- queues -------------------------------------------------------------

    /// Whether a task is referenced by either carry-over queue
    pub fn is_queued(&self, id: TaskId) -> bool {
        self.pending_queue.contains(&id) || self.dilate_queue.contains(&id)
    }

    // -- bucket -------------------------------------------------------------

    pub fn add_bucket_entry(
        &mut self,
        name: &str,
        priority: u8,
        created_on: NaiveDate,
    ) -> Result<u64, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        let id = self.allocate_entry_id();
        self.bucket.push(BucketEntry {
            id,
            name: name.to_string(),
            priority,
            created_on,
        });
        Ok(id)
    }

    pub fn bucket_entry(&self, id: u64) -> Option<&BucketEntry> {
        self.bucket.iter().find(|e| e.id == id)
    }

    pub fn remove_bucket_entry(&mut self, id: u64) -> Option<BucketEntry> {
        let idx = self.bucket.iter().position(|e| e.id == id)?;
        Some(self.bucket.remove(idx))
    }
}
