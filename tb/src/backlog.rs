//! Brain-dump backlog storage
//!
//! Plain CRUD over the task list, most recent first. Nothing here touches
//! priority slots; the planner layers the cascades on top.

use tracing::debug;

use crate::domain::{Task, TaskId};

/// Ordered list of backlog tasks
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    tasks: Vec<Task>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new task at the front
    ///
    /// Returns `None` (and stores nothing) when the trimmed text is empty.
    pub fn add(&mut self, text: &str) -> Option<TaskId> {
        let text = text.trim();
        if text.is_empty() {
            debug!("add: blank text ignored");
            return None;
        }
        let task = Task::new(text);
        let id = task.id.clone();
        debug!(%id, "add: inserted at front");
        self.tasks.insert(0, task);
        Some(id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Task at a display position (0 = most recent)
    pub fn at(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Remove and return a task
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| &t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Swap in a whole new task list, returning the old one
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Vec<Task> {
        debug!(count = tasks.len(), "replace_all: called");
        std::mem::replace(&mut self.tasks, tasks)
    }

    /// Update the cached priority flag; returns false for unknown ids
    pub fn set_priority_flag(&mut self, id: &TaskId, value: bool) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.is_priority = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.tasks.iter_mut()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks that are neither completed nor already AI-enhanced
    pub fn eligible_for_enhancement(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_eligible_for_enhancement())
    }

    pub fn has_eligible(&self) -> bool {
        self.tasks.iter().any(|t| t.is_eligible_for_enhancement())
    }
}
