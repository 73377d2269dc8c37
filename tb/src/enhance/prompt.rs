//! Prompt templates and provider-specific request shaping

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm::{CompletionRequest, Provider};

/// Placeholder replaced by the task text
pub const TASK_PLACEHOLDER: &str = "{TASK_TEXT}";

/// Built-in refinement instruction
pub const DEFAULT_PROMPT: &str = r#"You are an assistant that refines to-do list items. For the task "{TASK_TEXT}", please:
1. Make it clear and concise.
2. NO EXTRA WORDS !
3. Correct any spelling or grammatical errors.
4. Start the refined task with a single, relevant emoji.
5. VERY IMPORTANT: Do NOT add new information, sub-tasks, or expand the original task. The goal is refinement, not expansion.
Refined Task:"#;

/// System message sent to chat providers alongside a custom prompt
pub const GENERIC_SYSTEM_PROMPT: &str =
    "You are an AI assistant. Follow the user's instructions carefully to refine the provided task text.";

/// Where the default prompt splits into system and user halves
const DEFAULT_PROMPT_MARKER: &str = r#"For the task "{TASK_TEXT}", please:"#;

/// A refinement instruction containing (ideally) one `{TASK_TEXT}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PROMPT
    }

    pub fn has_placeholder(&self) -> bool {
        self.0.contains(TASK_PLACEHOLDER)
    }

    /// Substitute the first placeholder with `task_text`
    ///
    /// Without a placeholder the task is appended on its own line.
    pub fn render(&self, task_text: &str) -> String {
        if self.has_placeholder() {
            self.0.replacen(TASK_PLACEHOLDER, task_text, 1)
        } else {
            warn!("Prompt has no {} placeholder; appending task text", TASK_PLACEHOLDER);
            format!("{}\n\nTask to refine: \"{}\"", self.0, task_text)
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self(DEFAULT_PROMPT.to_string())
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PromptTemplate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PromptTemplate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Shape the request for one task
///
/// Gemini takes the rendered prompt as a single turn. OpenAI takes a
/// system/user pair: the default prompt is split at its "For the task"
/// sentence, a custom prompt goes out whole under a generic system message.
pub fn build_request(provider: Provider, template: &PromptTemplate, task_text: &str) -> CompletionRequest {
    match provider {
        Provider::Gemini => CompletionRequest::user(template.render(task_text)),
        Provider::OpenAI => match template.as_str().split_once(DEFAULT_PROMPT_MARKER) {
            Some((system, rest)) if template.is_default() => CompletionRequest::with_system(
                system.trim(),
                format!("For the task \"{}\", please:{}", task_text, rest.trim()),
            ),
            _ => CompletionRequest::with_system(GENERIC_SYSTEM_PROMPT, template.render(task_text)),
        },
    }
}
