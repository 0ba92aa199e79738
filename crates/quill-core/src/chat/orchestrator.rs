//! Conversation orchestrator: the bounded multi-turn tool loop
//!
//! One user message resolves through up to `MAX_MODEL_TURNS` round trips
//! to the backend. Turns that request tools execute them strictly in the
//! requested order (later calls may depend on earlier results within the
//! same turn's context), append the call/result pairs, and go back to the
//! model. Transport and credential failures end the turn with a localized,
//! classified assistant reply; messages appended before the failure stay
//! appended.

use std::sync::Arc;

use crate::logging::Logger;
use crate::providers::{ChatBackend, ChatRequest};
use crate::tools::ToolBridge;
use crate::types::ChatMessage;

use super::context::{build_system_context, failure_reply, history_from_transcript, max_turns_reply};

/// Hard ceiling on model round trips per user message
///
/// Bounds cost and guards against tool-calling cycles where the model
/// keeps requesting tools without converging.
pub const MAX_MODEL_TURNS: usize = 10;

/// Phase of the current chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    AwaitingModel,
    ExecutingTools,
    Done,
    Failed,
}

/// Input for one user message's resolution
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Full content of the active document
    pub document_content: String,
    /// Prior transcript (may start with the synthetic greeting)
    pub transcript: Vec<ChatMessage>,
    /// The new user message
    pub user_message: String,
    /// Reply language directive
    pub language: String,
}

/// Result of one user message's resolution
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Terminal phase: `Done` or `Failed`
    pub phase: TurnPhase,
    /// Messages to append to the transcript, in causal order: the user
    /// message, any tool-call/tool-result pairs, and the final assistant
    /// reply
    pub messages: Vec<ChatMessage>,
}

impl TurnOutcome {
    /// The final assistant reply
    pub fn reply(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// Drives the multi-turn conversation loop against a backend and the tool
/// bridge; protocol-agnostic by construction
pub struct Orchestrator {
    backend: Arc<dyn ChatBackend>,
    tools: Arc<dyn ToolBridge>,
    logger: Arc<dyn Logger>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        tools: Arc<dyn ToolBridge>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            backend,
            tools,
            logger,
        }
    }

    /// Resolve one user message
    pub async fn run_turn(&self, request: TurnRequest) -> TurnOutcome {
        let catalog = self.tools.llm_tools();
        let system = build_system_context(&request.document_content, &catalog, &request.language);
        let history = history_from_transcript(&request.transcript);

        let mut appended = vec![ChatMessage::user(&request.user_message)];

        for turn in 0..MAX_MODEL_TURNS {
            self.logger.debug(&format!(
                "[Orchestrator] model turn {}/{}",
                turn + 1,
                MAX_MODEL_TURNS
            ));

            let mut messages = history.clone();
            messages.extend(appended.iter().cloned());
            let chat_request = ChatRequest {
                system: system.clone(),
                messages,
                tools: catalog.clone(),
            };

            let response = match self.backend.complete(chat_request).await {
                Ok(response) => response,
                Err(e) => {
                    self.logger
                        .error(&format!("[Orchestrator] backend failure: {}", e));
                    appended.push(ChatMessage::assistant(failure_reply(&request.language, &e)));
                    return TurnOutcome {
                        phase: TurnPhase::Failed,
                        messages: appended,
                    };
                }
            };

            if !response.has_tool_calls() {
                appended.push(ChatMessage::assistant(response.text));
                return TurnOutcome {
                    phase: TurnPhase::Done,
                    messages: appended,
                };
            }

            self.logger.info(&format!(
                "[Orchestrator] executing {} tool call(s)",
                response.tool_calls.len()
            ));
            appended.push(ChatMessage::assistant_tool_calls(
                response.text,
                response.tool_calls.clone(),
            ));

            // Strictly sequential, in the order the model asked
            for call in &response.tool_calls {
                let result = self.tools.execute_tool_call(call).await;
                appended.push(ChatMessage::tool_result(
                    result.call_id,
                    result.tool_name,
                    result.content,
                ));
            }
        }

        self.logger
            .warn("[Orchestrator] turn ceiling reached without a final answer");
        appended.push(ChatMessage::assistant(max_turns_reply(&request.language)));
        TurnOutcome {
            phase: TurnPhase::Failed,
            messages: appended,
        }
    }
}
