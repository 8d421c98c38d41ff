use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskId};

/// A named group of tasks within one day.
///
/// Categories are owned exclusively by their day and created on demand when a
/// task is added or migrated. Names are case-insensitive unique within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub tasks: Vec<Task>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Category {
        Category {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Case-insensitive name match
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// One calendar day of a project's history.
///
/// The date is a plain calendar date with no offset attached, so a stored day
/// never shifts when the local UTC offset changes; the offset observed at
/// creation is kept alongside for reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub date: NaiveDate,
    /// Cached success rate, refreshed by the metrics engine
    #[serde(default)]
    pub sr: f64,
    /// Seconds east of UTC observed when this day was created
    pub gmt_offset: i32,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Day {
    pub fn new(date: NaiveDate, gmt_offset: i32) -> Day {
        Day {
            date,
            sr: 0.0,
            gmt_offset,
            categories: Vec::new(),
        }
    }

    /// Find a category by name, case-insensitively
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches(name))
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.matches(name))
    }

    /// Find a category by name, creating it if absent.
    /// The first spelling seen is the one kept.
    pub fn ensure_category(&mut self, name: &str) -> &mut Category {
        if let Some(idx) = self.categories.iter().position(|c| c.matches(name)) {
            return &mut self.categories[idx];
        }
        self.categories.push(Category::new(name));
        let last = self.categories.len() - 1;
        &mut self.categories[last]
    }

    /// Iterate over all tasks in all categories
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.categories.iter().flat_map(|c| c.tasks.iter())
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.categories.iter_mut().flat_map(|c| c.tasks.iter_mut())
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    pub fn find_task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks_mut().find(|t| t.id == id)
    }

    /// Remove a task from its owning category and return it.
    /// The category is kept even if emptied.
    pub fn take_task(&mut self, id: TaskId) -> Option<Task> {
        for category in &mut self.categories {
            if let Some(idx) = category.tasks.iter().position(|t| t.id == id) {
                return Some(category.tasks.remove(idx));
            }
        }
        None
    }

    /// The name of the category owning the given task
    pub fn category_of(&self, id: TaskId) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.tasks.iter().any(|t| t.id == id))
            .map(|c| c.name.as_str())
    }

    pub fn task_count(&self) -> usize {
        self.categories.iter().map(|c| c.tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.task_count() == 0
    }
}
