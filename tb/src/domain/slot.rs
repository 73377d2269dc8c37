//! Top-priority slot

use serde::{Deserialize, Serialize};

use super::{SlotId, TaskId};

/// Derived state of a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// No text and no source task
    Empty,
    /// Typed directly by the user
    Manual,
    /// Mirrors the text of a backlog task
    Linked(TaskId),
}

/// One ranked position in the top-priorities list
///
/// Reordering moves whole slot values between positions, so `id` always
/// travels with its text and source task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySlot {
    pub id: SlotId,
    pub text: String,
    pub source_task_id: Option<TaskId>,
}

impl PrioritySlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            text: String::new(),
            source_task_id: None,
        }
    }

    pub fn state(&self) -> SlotState {
        match (&self.source_task_id, self.text.is_empty()) {
            (Some(task_id), _) => SlotState::Linked(task_id.clone()),
            (None, true) => SlotState::Empty,
            (None, false) => SlotState::Manual,
        }
    }

    /// Empty means no text and no source task; a linked slot is never empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.source_task_id.is_none()
    }

    pub fn is_linked(&self) -> bool {
        self.source_task_id.is_some()
    }

    pub fn is_linked_to(&self, task_id: &TaskId) -> bool {
        self.source_task_id.as_ref() == Some(task_id)
    }

    /// Reset to empty, returning the task it was linked to (if any)
    pub fn clear(&mut self) -> Option<TaskId> {
        self.text.clear();
        self.source_task_id.take()
    }

    /// Link to a task, copying its text
    pub fn link(&mut self, task_id: TaskId, text: &str) {
        self.text = text.to_string();
        self.source_task_id = Some(task_id);
    }
}
