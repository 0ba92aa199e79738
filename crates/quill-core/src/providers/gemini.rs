//! Native chat-model protocol adapter (generateContent wire shape)
//!
//! The native protocol has a two-role conversation model (user/model),
//! declares tools in a dedicated `functionDeclarations` envelope, and
//! expects tool results wrapped as `functionResponse` parts on user-role
//! contents rather than as plain chat turns. The wire carries no call ids,
//! so this adapter synthesizes them; the rest of the system treats ids as
//! opaque.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::logging::Logger;
use crate::types::{ChatMessage, MessageRole, ToolCall};

use super::error::{ProviderError, ProviderResult};
use super::traits::{BackendConfig, BackendResponse, ChatBackend, ChatRequest};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireToolEnvelope>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

impl WirePart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_call: None,
            function_response: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
struct WireToolEnvelope {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<WireFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

// ============================================================================
// Marshalling
// ============================================================================

fn build_request_body(request: &ChatRequest) -> WireRequest {
    let system_instruction = if request.system.is_empty() {
        None
    } else {
        Some(WireContent {
            role: None,
            parts: vec![WirePart::text(&request.system)],
        })
    };

    let mut contents: Vec<WireContent> = Vec::new();
    for msg in &request.messages {
        match msg.role {
            // System context travels in systemInstruction, never as a turn
            MessageRole::System => {}
            MessageRole::User => contents.push(WireContent {
                role: Some("user".to_string()),
                parts: vec![WirePart::text(&msg.content)],
            }),
            MessageRole::Assistant => {
                let mut parts = Vec::new();
                if !msg.content.is_empty() {
                    parts.push(WirePart::text(&msg.content));
                }
                for call in &msg.tool_calls {
                    parts.push(WirePart {
                        text: None,
                        function_call: Some(WireFunctionCall {
                            name: call.name.clone(),
                            args: call.input.clone(),
                        }),
                        function_response: None,
                    });
                }
                if !parts.is_empty() {
                    contents.push(WireContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
            }
            MessageRole::Tool => {
                let part = WirePart {
                    text: None,
                    function_call: None,
                    function_response: Some(WireFunctionResponse {
                        name: msg.tool_name.clone().unwrap_or_default(),
                        response: json!({ "result": msg.content }),
                    }),
                };
                // All results for one turn share a single user content
                match contents.last_mut() {
                    Some(last)
                        if last.role.as_deref() == Some("user")
                            && last.parts.iter().all(|p| p.function_response.is_some()) =>
                    {
                        last.parts.push(part)
                    }
                    _ => contents.push(WireContent {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![WireToolEnvelope {
            function_declarations: request
                .tools
                .iter()
                .map(|t| WireFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                })
                .collect(),
        }]
    };

    WireRequest {
        system_instruction,
        contents,
        tools,
    }
}

fn parse_response(response: WireResponse) -> ProviderResult<BackendResponse> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::invalid_response("gemini", "no candidates"))?;

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();
    if let Some(content) = candidate.content {
        for part in content.parts {
            if let Some(text) = part.text {
                text_parts.push(text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall::new(
                    format!("call-{}", tool_calls.len()),
                    call.name,
                    call.args,
                ));
            }
        }
    }

    Ok(BackendResponse {
        text: text_parts.join(""),
        tool_calls,
    })
}

// ============================================================================
// Backend
// ============================================================================

/// Native-protocol backend adapter
pub struct GeminiBackend {
    config: BackendConfig,
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl GeminiBackend {
    /// Create a new native-protocol backend
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
impl ChatBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: ChatRequest) -> ProviderResult<BackendResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::missing_api_key("gemini"))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base(),
            self.config.model
        );
        let body = build_request_body(&request);

        self.logger.debug(&format!(
            "[GeminiBackend] {} contents, {} tools",
            body.contents.len(),
            request.tools.len()
        ));

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status("gemini", status.as_u16(), message));
        }

        let wire: WireResponse = response.json().await?;
        parse_response(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tool;

    fn request_with_tool_round_trip() -> ChatRequest {
        ChatRequest {
            system: "Be helpful".to_string(),
            messages: vec![
                ChatMessage::user("Summarize my notes"),
                ChatMessage::assistant_tool_calls(
                    "",
                    vec![
                        ToolCall::new("call-0", "read_document", json!({"name": "a.md"})),
                        ToolCall::new("call-1", "read_document", json!({"name": "b.md"})),
                    ],
                ),
                ChatMessage::tool_result("call-0", "read_document", "alpha"),
                ChatMessage::tool_result("call-1", "read_document", "beta"),
            ],
            tools: vec![Tool::new("read_document", "Read a document")],
        }
    }

    #[test]
    fn test_marshalling_role_pairs() {
        let body = build_request_body(&request_with_tool_round_trip());

        assert!(body.system_instruction.is_some());
        // user, model(functionCalls), user(functionResponses)
        assert_eq!(body.contents.len(), 3);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
        assert_eq!(body.contents[2].role.as_deref(), Some("user"));

        // Both tool calls marshal as functionCall parts
        assert_eq!(body.contents[1].parts.len(), 2);
        assert!(body.contents[1].parts[0].function_call.is_some());

        // Both results share one user content as functionResponse parts
        assert_eq!(body.contents[2].parts.len(), 2);
        assert!(body.contents[2].parts.iter().all(|p| p.function_response.is_some()));

        assert_eq!(body.tools.len(), 1);
        assert_eq!(body.tools[0].function_declarations[0].name, "read_document");
    }

    #[test]
    fn test_marshalling_empty_tool_set() {
        let request = ChatRequest {
            system: String::new(),
            messages: vec![ChatMessage::user("hi")],
            tools: Vec::new(),
        };
        let body = build_request_body(&request);
        assert!(body.system_instruction.is_none());
        assert!(body.tools.is_empty());

        // No `tools` key at all on the wire
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("\"tools\""));
    }

    #[test]
    fn test_parse_plain_text_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Hello "}, {"text": "world"}]
                }
            }]
        }))
        .unwrap();

        let response = parse_response(wire).unwrap();
        assert_eq!(response.text, "Hello world");
        assert!(!response.has_tool_calls());
    }

    #[test]
    fn test_parse_function_call_response() {
        let wire: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"functionCall": {"name": "read_document", "args": {"name": "a.md"}}}
                    ]
                }
            }]
        }))
        .unwrap();

        let response = parse_response(wire).unwrap();
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "read_document");
        // Synthesized call id
        assert_eq!(response.tool_calls[0].id, "call-0");
    }

    #[test]
    fn test_parse_empty_candidates_is_invalid() {
        let wire: WireResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(matches!(
            parse_response(wire),
            Err(ProviderError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let backend = GeminiBackend::new(
            BackendConfig::new("gemini-2.0-flash"),
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
