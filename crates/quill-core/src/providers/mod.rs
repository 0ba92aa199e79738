//! Model backend adapters
//!
//! Two wire protocols implement the same `ChatBackend` contract: the
//! native chat-model protocol (`GeminiBackend`) and the OpenAI-compatible
//! chat completions protocol (`OpenAiBackend`). The chat loop only ever
//! sees the shared message representation; each adapter owns its
//! marshalling. `MockBackend` is kept for testing.

mod error;
mod gemini;
mod mock;
mod openai;
mod traits;

pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{BackendConfig, BackendResponse, ChatBackend, ChatRequest};

use std::sync::Arc;

use crate::config::{ProviderKind, Settings};
use crate::logging::Logger;

/// Create the backend matching the configured provider kind
pub fn create_backend(settings: &Settings, logger: Arc<dyn Logger>) -> Arc<dyn ChatBackend> {
    let mut config = BackendConfig::new(&settings.model);
    config.api_key = settings.api_key.clone();
    config.api_base = settings.api_base.clone();

    let client = reqwest::Client::new();
    match settings.provider {
        ProviderKind::Gemini => Arc::new(GeminiBackend::new(config, client, logger)),
        ProviderKind::OpenAi => Arc::new(OpenAiBackend::new(config, client, logger)),
    }
}
