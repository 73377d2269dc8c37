//! Brain-dump task

use serde::{Deserialize, Serialize};

use super::TaskId;

/// A backlog ("brain dump") task
///
/// `is_priority` mirrors whether a priority slot links this task. It is a
/// cached copy for cheap filtering; only the planner writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub ai_enhanced: bool,
    pub is_priority: bool,
}

impl Task {
    /// Create a fresh task with all flags cleared
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            text: text.into(),
            completed: false,
            ai_enhanced: false,
            is_priority: false,
        }
    }

    /// Whether the enhancement pipeline may still refine this task
    pub fn is_eligible_for_enhancement(&self) -> bool {
        !self.completed && !self.ai_enhanced
    }
}
