//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Implementations must be shareable across concurrent calls; the
/// enhancement pipeline fans out one call per eligible task.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    type Handler = Box<dyn Fn(&CompletionRequest) -> Result<CompletionResponse, LlmError> + Send + Sync>;

    enum Behavior {
        Sequence(Vec<CompletionResponse>),
        Handler(Handler),
    }

    /// Mock LLM client for unit tests
    pub struct MockLlmClient {
        behavior: Behavior,
        call_count: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        /// Replay `responses` in call order, erroring once exhausted
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            Self {
                behavior: Behavior::Sequence(responses),
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Answer every call through `handler`
        pub fn with_handler<F>(handler: F) -> Self
        where
            F: Fn(&CompletionRequest) -> Result<CompletionResponse, LlmError> + Send + Sync + 'static,
        {
            Self {
                behavior: Behavior::Handler(Box::new(handler)),
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            match &self.behavior {
                Behavior::Sequence(responses) => responses.get(idx).cloned().ok_or_else(|| {
                    debug!("MockLlmClient::complete: no more mock responses");
                    LlmError::InvalidResponse("No more mock responses".to_string())
                }),
                Behavior::Handler(handler) => handler(&request),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockLlmClient::new(vec![
                CompletionResponse::text("Response 1"),
                CompletionResponse::text("Response 2"),
            ]);

            let req = CompletionRequest::user("Test");
            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            let result = client.complete(CompletionRequest::user("Test")).await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_handler() {
            let client = MockLlmClient::with_handler(|req| Ok(CompletionResponse::text(req.user_prompt.to_uppercase())));
            let resp = client.complete(CompletionRequest::user("abc")).await.unwrap();
            assert_eq!(resp.content.as_deref(), Some("ABC"));
        }
    }
}
