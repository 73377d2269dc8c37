//! Admission refusals surfaced to the user

use thiserror::Error;

use crate::domain::TaskId;

/// Why a promotion was refused; state is unchanged in every case
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("No task with id {0}")]
    UnknownTask(TaskId),

    #[error("Completed tasks cannot become top priorities.")]
    TaskCompleted,

    #[error("This task is already a top priority.")]
    AlreadyPriority,

    #[error("All {capacity} top-priority slots are full. Clear one to make room.")]
    SlotsFull { capacity: usize },
}
