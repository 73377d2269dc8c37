//! Timebox - daily planner with ranked top priorities
//!
//! A brain-dump backlog of tasks, a short fixed-size list of top-priority
//! slots, and batch AI refinement of task wording.
//!
//! # Core Concepts
//!
//! - **Two linked views**: a slot either holds free text or links one task;
//!   a linked slot always shows its task's current text
//! - **Single writer**: [`Planner`] applies every cascade (complete, edit,
//!   delete) to both sides in the same call
//! - **Batch commit**: AI Magic refines tasks concurrently and replaces the
//!   backlog once, after every call has settled
//!
//! # Modules
//!
//! - [`domain`] - Task, slot, and id types
//! - [`backlog`] / [`priorities`] - the two stores
//! - [`planner`] - synchronization rules between them
//! - [`llm`] - Gemini and OpenAI clients behind one trait
//! - [`enhance`] - prompt shaping and the AI Magic pipeline
//! - [`settings`] - persisted user preferences
//! - [`config`] - configuration types and loading
//! - [`cli`] / [`repl`] - command-line interface and interactive shell

pub mod backlog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod enhance;
pub mod llm;
pub mod planner;
pub mod priorities;
pub mod repl;
pub mod settings;

// Re-export commonly used types
pub use backlog::Backlog;
pub use config::{Config, LlmConfig};
pub use domain::{PrioritySlot, SlotId, SlotState, Task, TaskId};
pub use enhance::{DEFAULT_PROMPT, EnhanceBlocked, EnhanceReport, EnhanceRequest, Enhancer, PromptTemplate};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Provider, create_client};
pub use planner::{Planner, Refusal};
pub use priorities::PrioritySlots;
pub use settings::{MAX_PROMPT_HISTORY, Settings, TimeFormat};
