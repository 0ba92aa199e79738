//! Backend trait definition

use async_trait::async_trait;

use crate::types::{ChatMessage, Tool, ToolCall};

use super::error::ProviderResult;

/// Connection configuration for a backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Model identifier as used by the backend's API
    pub model: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl BackendConfig {
    /// Create a new backend config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// One model request: context, history and the available tool set
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System context (behavioral instructions, document, tool catalog,
    /// language directive)
    pub system: String,
    /// Conversation so far, including tool-call and tool-result messages
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call; may be empty
    pub tools: Vec<Tool>,
}

/// Backend answer: plain text and/or requested tool calls
#[derive(Debug, Clone, Default)]
pub struct BackendResponse {
    /// Assistant text (may be empty when only tools were requested)
    pub text: String,
    /// Tool calls the model wants executed, in request order
    pub tool_calls: Vec<ToolCall>,
}

impl BackendResponse {
    /// A plain text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A response requesting tool calls
    pub fn with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: text.into(),
            tool_calls,
        }
    }

    /// Whether the model requested any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Backend trait for model protocol adapters
///
/// Each wire protocol (native chat-model, OpenAI-compatible) implements
/// this trait; all protocol-specific marshalling stays inside the adapter
/// so the chat loop is protocol-agnostic.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name (e.g. "gemini", "openai")
    fn name(&self) -> &str;

    /// Run one model request
    async fn complete(&self, request: ChatRequest) -> ProviderResult<BackendResponse>;
}
