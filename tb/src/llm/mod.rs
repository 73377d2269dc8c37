//! LLM client module for Timebox
//!
//! Provides the text-refinement providers behind one trait.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Provider, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client for `provider`
///
/// `credential` is the key stored in settings; when it is absent or blank
/// the provider's `api-key-env` variable is consulted instead.
pub fn create_client(
    provider: Provider,
    credential: Option<&str>,
    config: &LlmConfig,
) -> Result<Arc<dyn LlmClient>, LlmError> {
    let resolved = config.resolve(provider);
    debug!(%provider, model = %resolved.model, "create_client: called");

    let api_key = credential
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| resolved.env_api_key())
        .ok_or(LlmError::MissingCredential(provider))?;

    match provider {
        Provider::Gemini => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(&resolved, api_key)?))
        }
        Provider::OpenAI => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(&resolved, api_key)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use serial_test::serial;

    fn config_with_env(var: &str) -> LlmConfig {
        LlmConfig {
            gemini: ProviderConfig {
                api_key_env: Some(var.to_string()),
                ..Default::default()
            },
            openai: ProviderConfig {
                api_key_env: Some(var.to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    #[serial]
    fn test_create_client_with_stored_credential() {
        let config = config_with_env("TIMEBOX_TEST_UNSET_KEY");
        unsafe { std::env::remove_var("TIMEBOX_TEST_UNSET_KEY") };

        assert!(create_client(Provider::Gemini, Some("abc"), &config).is_ok());
        assert!(create_client(Provider::OpenAI, Some("abc"), &config).is_ok());
    }

    #[test]
    #[serial]
    fn test_create_client_missing_credential() {
        let config = config_with_env("TIMEBOX_TEST_UNSET_KEY");
        unsafe { std::env::remove_var("TIMEBOX_TEST_UNSET_KEY") };

        let err = create_client(Provider::OpenAI, Some("   "), &config).err().unwrap();
        assert!(matches!(err, LlmError::MissingCredential(Provider::OpenAI)));
        assert_eq!(err.to_string(), "OpenAI API Key not set");
    }

    #[test]
    #[serial]
    fn test_create_client_env_fallback() {
        let config = config_with_env("TIMEBOX_TEST_FALLBACK_KEY");
        unsafe { std::env::set_var("TIMEBOX_TEST_FALLBACK_KEY", "from-env") };

        assert!(create_client(Provider::Gemini, None, &config).is_ok());

        unsafe { std::env::remove_var("TIMEBOX_TEST_FALLBACK_KEY") };
    }
}
