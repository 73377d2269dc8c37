//! Errors from refinement providers

use std::time::Duration;
use thiserror::Error;

use super::types::Provider;

/// Why a single refinement call produced no text
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{} API Key not set", .0.display_name())]
    MissingCredential(Provider),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_provider() {
        assert_eq!(
            LlmError::MissingCredential(Provider::Gemini).to_string(),
            "Gemini API Key not set"
        );
        assert_eq!(
            LlmError::MissingCredential(Provider::OpenAI).to_string(),
            "OpenAI API Key not set"
        );
    }

    #[test]
    fn test_call_timeout_message() {
        let err = LlmError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "No response within 60s");
    }

    #[test]
    fn test_malformed_body_converts_to_json_error() {
        fn parse(body: &str) -> Result<serde_json::Value, LlmError> {
            Ok(serde_json::from_str(body)?)
        }

        let err = parse("{\"candidates\": [").unwrap_err();
        assert!(matches!(err, LlmError::Json(_)));
        assert!(err.to_string().starts_with("JSON serialization error"));
    }

    #[test]
    fn test_provider_rejection_keeps_status_and_body() {
        let err = LlmError::ApiError {
            status: 401,
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: API key not valid");
    }
}
