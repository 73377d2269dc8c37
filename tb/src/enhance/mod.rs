//! AI Magic - batch refinement of backlog tasks
//!
//! [`prompt`] shapes one provider request per task; [`pipeline`] fans the
//! requests out, waits for all of them, and commits the batch through
//! [`Planner::replace_all`](crate::planner::Planner::replace_all).

mod pipeline;
mod prompt;

pub use pipeline::{EnhanceBlocked, EnhanceReport, EnhanceRequest, Enhancer};
pub use prompt::{DEFAULT_PROMPT, GENERIC_SYSTEM_PROMPT, PromptTemplate, TASK_PLACEHOLDER, build_request};
