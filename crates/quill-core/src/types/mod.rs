//! Core types shared across the workspace and the chat loop

mod message;
mod tool;

pub use message::{ChatMessage, MessageRole};
pub use tool::{Tool, ToolCall, ToolResult};
