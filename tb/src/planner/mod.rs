//! Planner - keeps the backlog and the top-priorities list in sync
//!
//! Every mutation that could break the task/slot link goes through
//! [`Planner`], which applies the follow-up changes (cascades) in the same
//! call so callers never observe a dangling `source_task_id` or a stale
//! `is_priority` flag.

mod core;
mod messages;

pub use core::Planner;
pub use messages::Refusal;
