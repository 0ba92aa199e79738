//! OpenAI-compatible protocol adapter (chat completions wire shape)
//!
//! Conversation history is a flat role-tagged array
//! (system/user/assistant/tool). Tool calls appear as structured fields on
//! assistant messages with stringified JSON arguments; tool results are
//! separate `role:"tool"` messages tagged with the originating call id and
//! tool name.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::Logger;
use crate::types::{ChatMessage, MessageRole, ToolCall};

use super::error::{ProviderError, ProviderResult};
use super::traits::{BackendConfig, BackendResponse, ChatBackend, ChatRequest};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(rename = "tool_calls", default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(rename = "tool_call_id", skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl WireMessage {
    fn plain(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded argument object
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireToolFunction,
}

#[derive(Debug, Serialize)]
struct WireToolFunction {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

// ============================================================================
// Marshalling
// ============================================================================

fn build_request_body(model: &str, request: &ChatRequest) -> WireRequest {
    let mut messages = Vec::new();
    if !request.system.is_empty() {
        messages.push(WireMessage::plain("system", &request.system));
    }

    for msg in &request.messages {
        match msg.role {
            // The assembled system context is the only system message
            MessageRole::System => {}
            MessageRole::User => messages.push(WireMessage::plain("user", &msg.content)),
            MessageRole::Assistant => messages.push(WireMessage {
                role: "assistant".to_string(),
                content: if msg.content.is_empty() && msg.has_tool_calls() {
                    None
                } else {
                    Some(msg.content.clone())
                },
                tool_calls: msg
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.id.clone(),
                        kind: "function".to_string(),
                        function: WireFunction {
                            name: call.name.clone(),
                            arguments: call.input.to_string(),
                        },
                    })
                    .collect(),
                tool_call_id: None,
                name: None,
            }),
            MessageRole::Tool => messages.push(WireMessage {
                role: "tool".to_string(),
                content: Some(msg.content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: msg.tool_call_id.clone(),
                name: msg.tool_name.clone(),
            }),
        }
    }

    let tools = request
        .tools
        .iter()
        .map(|t| WireTool {
            kind: "function".to_string(),
            function: WireToolFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.input_schema.clone(),
            },
        })
        .collect();

    WireRequest {
        model: model.to_string(),
        messages,
        tools,
    }
}

fn parse_response(response: WireResponse) -> ProviderResult<BackendResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::invalid_response("openai", "no choices"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| {
            // Arguments arrive as a JSON string; an unparsable blob is
            // passed through so the tool sees what the model sent
            let input = serde_json::from_str(&tc.function.arguments)
                .unwrap_or(Value::String(tc.function.arguments));
            ToolCall::new(tc.id, tc.function.name, input)
        })
        .collect();

    Ok(BackendResponse {
        text: choice.message.content.unwrap_or_default(),
        tool_calls,
    })
}

// ============================================================================
// Backend
// ============================================================================

/// OpenAI-compatible backend adapter
pub struct OpenAiBackend {
    config: BackendConfig,
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(config: BackendConfig, client: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            client,
            logger,
        }
    }

    fn api_base(&self) -> &str {
        self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: ChatRequest) -> ProviderResult<BackendResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::missing_api_key("openai"))?;

        let url = format!("{}/chat/completions", self.api_base());
        let body = build_request_body(&self.config.model, &request);

        self.logger.debug(&format!(
            "[OpenAiBackend] {} messages, {} tools",
            body.messages.len(),
            body.tools.len()
        ));

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status("openai", status.as_u16(), message));
        }

        let wire: WireResponse = response.json().await?;
        parse_response(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tool;
    use serde_json::json;

    #[test]
    fn test_marshalling_flat_roles() {
        let request = ChatRequest {
            system: "Be helpful".to_string(),
            messages: vec![
                ChatMessage::user("Summarize my notes"),
                ChatMessage::assistant_tool_calls(
                    "",
                    vec![ToolCall::new("call_9", "read_document", json!({"name": "a.md"}))],
                ),
                ChatMessage::tool_result("call_9", "read_document", "alpha"),
                ChatMessage::assistant("Your notes say alpha."),
            ],
            tools: vec![Tool::new("read_document", "Read a document")],
        };
        let body = build_request_body("gpt-4o-mini", &request);

        let roles: Vec<&str> = body.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "tool", "assistant"]);

        // Tool-calling assistant message: null content, structured calls
        let asst = &body.messages[2];
        assert!(asst.content.is_none());
        assert_eq!(asst.tool_calls[0].id, "call_9");
        assert_eq!(asst.tool_calls[0].function.arguments, r#"{"name":"a.md"}"#);

        // Tool result tagged with the originating call id and tool name
        let tool = &body.messages[3];
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(tool.name.as_deref(), Some("read_document"));

        assert_eq!(body.tools.len(), 1);
        assert_eq!(body.tools[0].function.name, "read_document");
    }

    #[test]
    fn test_marshalling_empty_tool_set() {
        let request = ChatRequest {
            system: String::new(),
            messages: vec![ChatMessage::user("hi")],
            tools: Vec::new(),
        };
        let body = build_request_body("gpt-4o-mini", &request);
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("\"tools\""));
    }

    #[test]
    fn test_parse_plain_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"}
            }]
        }))
        .unwrap();
        let response = parse_response(wire).unwrap();
        assert_eq!(response.text, "Hello!");
        assert!(!response.has_tool_calls());
    }

    #[test]
    fn test_parse_tool_call_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "read_document",
                            "arguments": "{\"name\":\"a.md\"}"
                        }
                    }]
                }
            }]
        }))
        .unwrap();
        let response = parse_response(wire).unwrap();
        assert_eq!(response.text, "");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_abc");
        assert_eq!(response.tool_calls[0].get_arg_str("name"), Some("a.md"));
    }

    #[test]
    fn test_parse_unparsable_arguments_pass_through() {
        let wire: WireResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_x",
                        "type": "function",
                        "function": {"name": "t", "arguments": "not json"}
                    }]
                }
            }]
        }))
        .unwrap();
        let response = parse_response(wire).unwrap();
        assert_eq!(response.tool_calls[0].input, Value::String("not json".to_string()));
    }

    #[test]
    fn test_parse_empty_choices_is_invalid() {
        let wire: WireResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_response(wire),
            Err(ProviderError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let backend = OpenAiBackend::new(
            BackendConfig::new("gpt-4o-mini"),
            reqwest::Client::new(),
            Arc::new(crate::logging::NoOpLogger),
        );
        let err = backend
            .complete(ChatRequest {
                system: String::new(),
                messages: vec![ChatMessage::user("hi")],
                tools: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
    }
}
