//! LLM request/response types
//!
//! Provider-agnostic: each client maps these onto its own wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which text-refinement service to call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
}

impl Provider {
    /// Name shown to the user
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Stored/configured identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            other => Err(format!("Unknown AI provider: '{}'. Supported: gemini, openai", other)),
        }
    }
}

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Optional system instruction
    pub system_prompt: Option<String>,

    /// The user-turn text
    pub user_prompt: String,

    /// Max tokens for the response; `None` uses the client's configured value
    pub max_tokens: Option<u32>,

    /// Sampling temperature; `None` uses the client's configured value
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Request with only a user prompt
    pub fn user(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Request with a system/user pair
    pub fn with_system(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system.into()),
            ..Self::user(prompt)
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Token usage
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_and_display() {
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(" OpenAI ".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("claude".parse::<Provider>().is_err());

        assert_eq!(Provider::Gemini.display_name(), "Gemini");
        assert_eq!(Provider::OpenAI.display_name(), "OpenAI");
        assert_eq!(Provider::OpenAI.to_string(), "openai");
        assert_eq!(Provider::default(), Provider::Gemini);
    }

    #[test]
    fn test_provider_serde() {
        assert_eq!(serde_json::to_string(&Provider::OpenAI).unwrap(), "\"openai\"");
        let p: Provider = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(p, Provider::Gemini);
    }

    #[test]
    fn test_request_builders() {
        let req = CompletionRequest::with_system("sys", "hello");
        assert_eq!(req.system_prompt.as_deref(), Some("sys"));
        assert_eq!(req.user_prompt, "hello");
        assert_eq!(req.max_tokens, None);
    }
}
