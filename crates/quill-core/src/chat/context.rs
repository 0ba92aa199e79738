//! System-context assembly and localized turn-failure replies

use crate::providers::ProviderError;
use crate::types::{ChatMessage, MessageRole, Tool};

const INSTRUCTIONS: &str = "You are a writing assistant embedded in a document workspace. \
Help the user think, outline and edit. Ground your answers in the active document; \
use the available tools when they can supply facts you do not have. \
Keep answers concise and in plain prose unless asked otherwise.";

/// Assemble the system context for one user message
///
/// Combines the fixed behavioral instructions, the active document's full
/// content, the tool catalog (when non-empty) and the language directive.
pub(crate) fn build_system_context(document_content: &str, tools: &[Tool], language: &str) -> String {
    let mut context = String::from(INSTRUCTIONS);

    context.push_str("\n\nThe user's active document:\n---\n");
    context.push_str(document_content);
    context.push_str("\n---");

    if !tools.is_empty() {
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        context.push_str("\n\nAvailable tools: ");
        context.push_str(&names.join(", "));
    }

    context.push_str("\n\nReply in language: ");
    context.push_str(language);
    context
}

/// Conversation history sent to the backend
///
/// Excludes system-role messages and the synthetic initial greeting (the
/// assistant message a fresh transcript starts with).
pub(crate) fn history_from_transcript(transcript: &[ChatMessage]) -> Vec<ChatMessage> {
    transcript
        .iter()
        .enumerate()
        .filter(|(i, msg)| {
            if msg.role == MessageRole::System {
                return false;
            }
            !(*i == 0 && msg.role == MessageRole::Assistant)
        })
        .map(|(_, msg)| msg.clone())
        .collect()
}

/// Localized assistant reply for a failed turn, classified by cause
///
/// Distinguishes "not configured" from "rejected by the server" from
/// generic transport failure.
pub(crate) fn failure_reply(language: &str, error: &ProviderError) -> String {
    let german = language.starts_with("de");
    match error {
        ProviderError::MissingApiKey { .. } => {
            if german {
                "Es ist kein API-Schlüssel konfiguriert. Bitte hinterlege einen \
                 Schlüssel in den Einstellungen, um den Assistenten zu nutzen."
                    .to_string()
            } else {
                "No API key is configured. Add one in the settings to use the assistant."
                    .to_string()
            }
        }
        ProviderError::Unauthorized { .. } => {
            if german {
                "Der Server hat den konfigurierten API-Schlüssel abgelehnt. \
                 Bitte überprüfe den Schlüssel in den Einstellungen."
                    .to_string()
            } else {
                "The server rejected the configured API key. Please check the key in the settings."
                    .to_string()
            }
        }
        other => {
            if german {
                format!("Die Anfrage an das Modell ist fehlgeschlagen: {}", other)
            } else {
                format!("The request to the model failed: {}", other)
            }
        }
    }
}

/// Localized reply for a turn that hit the model-turn ceiling
pub(crate) fn max_turns_reply(language: &str) -> String {
    if language.starts_with("de") {
        "Die maximale Anzahl an Modell-Runden wurde überschritten, ohne dass eine \
         Antwort zustande kam. Bitte versuche es mit einer einfacheren Frage erneut."
            .to_string()
    } else {
        "The maximum number of model turns was exceeded without reaching an answer. \
         Please try again with a simpler question."
            .to_string()
    }
}
