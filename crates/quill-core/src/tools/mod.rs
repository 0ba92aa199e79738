//! Tool registry & bridge: uniform tool discovery and invocation across
//! connected tool servers, regardless of transport

mod registry;

use async_trait::async_trait;

use crate::types::{Tool, ToolCall, ToolResult};

pub use registry::{ServerStatus, ToolInfo, ToolRegistry};

/// Uniform invoke contract the chat loop depends on
///
/// `ToolRegistry` is the production implementation; tests drive the
/// orchestrator with a scripted fake.
#[async_trait]
pub trait ToolBridge: Send + Sync {
    /// All discovered tools with their affinity tags
    fn catalog(&self) -> Vec<ToolInfo>;

    /// Tool definitions in the shape backends expect
    fn llm_tools(&self) -> Vec<Tool>;

    /// Execute a tool call, converting every failure into an error result
    async fn execute_tool_call(&self, call: &ToolCall) -> ToolResult;
}
