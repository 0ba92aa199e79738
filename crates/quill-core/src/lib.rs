//! Quill Core
//!
//! Runtime-agnostic core of the Quill document workspace: the in-memory
//! document tree with selection and tab state, workspace persistence, and
//! an AI conversation orchestrator with MCP tool calling.
//!
//! ## Workspace
//!
//! The `workspace` module holds the document model:
//! - Flat document store with parent links forming a folder tree
//! - Tab strip, multi-selection and click handling
//! - JSON snapshot persistence
//!
//! ## Chat
//!
//! The `chat` module resolves user messages against a model backend:
//!
//! ```rust,ignore
//! use quill_core::chat::{Orchestrator, TurnRequest};
//!
//! let orchestrator = Orchestrator::new(backend, tools, logger);
//! let outcome = orchestrator.run_turn(request).await;
//! transcript.extend(outcome.messages);
//! ```

pub mod chat;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;
pub mod storage;
pub mod tools;
pub mod types;
pub mod workspace;

// Re-export commonly used types
pub use types::{ChatMessage, MessageRole, Tool, ToolCall, ToolResult};

pub use workspace::{
    ClickModifiers, Document, DocumentKind, DocumentTree, SelectionController, TreeError,
    TreeResult, WorkspaceIo, WorkspaceSnapshot, WorkspaceStore,
};

pub use logging::{ConsoleLogger, Logger, NoOpLogger};

pub use config::{
    ConfigError, ConfigResult, FileSettingsStore, ProviderKind, Settings, ToolServerConfig,
    ToolTransport,
};

pub use providers::{
    create_backend, BackendConfig, BackendResponse, ChatBackend, ChatRequest, GeminiBackend,
    MockBackend, OpenAiBackend, ProviderError, ProviderResult,
};

pub use tools::{ServerStatus, ToolBridge, ToolInfo, ToolRegistry};

// MCP client using the official rmcp SDK
pub use mcp::{McpClient, McpError, McpResult};

pub use storage::{MemoryStorage, StorageError, StorageIo, StoredFile};

pub use chat::{Orchestrator, TurnOutcome, TurnPhase, TurnRequest, MAX_MODEL_TURNS};
