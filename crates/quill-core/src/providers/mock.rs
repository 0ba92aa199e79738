//! Mock backend for testing
//!
//! Provides deterministic, scripted responses without network
//! dependencies. Each `complete` call pops the next scripted step; an
//! exhausted script echoes the last user message, so simple tests need no
//! scripting at all. Received requests are recorded for assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::logging::Logger;
use crate::types::MessageRole;

use super::error::{ProviderError, ProviderResult};
use super::traits::{BackendResponse, ChatBackend, ChatRequest};

/// Mock backend with a scripted response queue
pub struct MockBackend {
    script: Mutex<VecDeque<ProviderResult<BackendResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockBackend {
    /// Create a mock with an empty script (pure echo)
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Queue a successful response
    pub fn push_response(&self, response: BackendResponse) {
        self.script.lock().push_back(Ok(response));
    }

    /// Queue an error
    pub fn push_error(&self, error: ProviderError) {
        self.script.lock().push_back(Err(error));
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn echo(&self, request: &ChatRequest) -> BackendResponse {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        BackendResponse::text(format!("echo: {}", last_user))
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ChatRequest) -> ProviderResult<BackendResponse> {
        self.logger.debug(&format!(
            "[MockBackend] request with {} messages",
            request.messages.len()
        ));

        let next = self.script.lock().pop_front();
        let result = match next {
            Some(step) => step,
            None => Ok(self.echo(&request)),
        };
        self.requests.lock().push(request);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::{ChatMessage, ToolCall};
    use serde_json::json;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            system: String::new(),
            messages: vec![ChatMessage::user(text)],
            tools: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_echo_when_unscripted() {
        let mock = MockBackend::new(Arc::new(NoOpLogger));
        let response = mock.complete(request("hello")).await.unwrap();
        assert_eq!(response.text, "echo: hello");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_sequence() {
        let mock = MockBackend::new(Arc::new(NoOpLogger));
        mock.push_response(BackendResponse::with_tool_calls(
            "",
            vec![ToolCall::new("c1", "t", json!({}))],
        ));
        mock.push_error(ProviderError::missing_api_key("mock"));

        let first = mock.complete(request("a")).await.unwrap();
        assert!(first.has_tool_calls());

        let second = mock.complete(request("b")).await;
        assert!(matches!(second, Err(ProviderError::MissingApiKey { .. })));

        // Script exhausted: back to echo
        let third = mock.complete(request("c")).await.unwrap();
        assert_eq!(third.text, "echo: c");
    }
}
