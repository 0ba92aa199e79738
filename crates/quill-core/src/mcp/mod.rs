//! MCP tool-server client (official rmcp SDK)

mod client;

pub use client::{McpClient, McpError, McpResult};
