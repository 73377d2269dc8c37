//! Domain types for timebox
//!
//! Tasks live in the brain-dump backlog; priority slots live in the fixed
//! top-priorities list. The two are related only by id lookup
//! (`PrioritySlot::source_task_id`), never by direct reference.

mod id;
mod slot;
mod task;

pub use id::{SlotId, TaskId};
pub use slot::{PrioritySlot, SlotState};
pub use task::Task;
