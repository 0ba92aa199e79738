//! Tool registry: discovery and execution across connected tool servers
//!
//! The registry owns at most one live connection set at a time. Each
//! discovered tool carries the name of the server that advertised it (its
//! affinity tag); invocation dispatches on that tag. One misbehaving
//! server never takes down the aggregate: its tools are excluded and its
//! failures become error-text results.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ToolServerConfig, ToolTransport};
use crate::logging::Logger;
use crate::mcp::McpClient;
use crate::types::{Tool, ToolCall, ToolResult};

use super::ToolBridge;

/// A discovered tool with its originating server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for tool parameters
    pub input_schema: Value,
    /// Affinity tag: the server that must execute this tool
    pub server: String,
}

impl From<&ToolInfo> for Tool {
    fn from(info: &ToolInfo) -> Self {
        Tool {
            name: info.name.clone(),
            description: info.description.clone(),
            input_schema: Some(info.input_schema.clone()),
        }
    }
}

/// Per-config outcome of a connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// Connection established and initialized
    Connected { name: String },
    /// Connection failed with a reason
    Failed { name: String, reason: String },
}

impl ServerStatus {
    pub fn name(&self) -> &str {
        match self {
            ServerStatus::Connected { name } => name,
            ServerStatus::Failed { name, .. } => name,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ServerStatus::Connected { .. })
    }
}

/// Tool registry managing connections, discovery and execution
pub struct ToolRegistry {
    /// Connected clients keyed by server name (affinity tag)
    clients: RwLock<HashMap<String, Arc<McpClient>>>,
    /// Cached tools from the last refresh
    tools: RwLock<Vec<ToolInfo>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create a registry with no connections
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            tools: RwLock::new(Vec::new()),
            logger,
        }
    }

    /// Establish connections for all enabled configs
    ///
    /// Previously open connections are torn down first so reconnecting
    /// never leaks processes or duplicates tool registrations. A failure
    /// for one config does not prevent the others from connecting; every
    /// enabled config gets an individual status. Finishes with a tool
    /// refresh across whatever connected.
    pub async fn connect(&self, configs: &[ToolServerConfig]) -> Vec<ServerStatus> {
        self.teardown().await;

        let mut statuses = Vec::new();
        for config in configs.iter().filter(|c| c.enabled) {
            let result = match &config.transport {
                ToolTransport::Stdio { command, args } => {
                    McpClient::connect_stdio(command, args, Arc::clone(&self.logger)).await
                }
                ToolTransport::Http { url } => {
                    McpClient::connect_http(url, Arc::clone(&self.logger)).await
                }
            };

            match result {
                Ok(client) => {
                    self.clients
                        .write()
                        .insert(config.name.clone(), Arc::new(client));
                    statuses.push(ServerStatus::Connected {
                        name: config.name.clone(),
                    });
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "[ToolRegistry] Failed to connect '{}': {}",
                        config.name, e
                    ));
                    statuses.push(ServerStatus::Failed {
                        name: config.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.refresh().await;
        statuses
    }

    /// Tear down all open connections
    pub async fn teardown(&self) {
        let old: Vec<(String, Arc<McpClient>)> = self.clients.write().drain().collect();
        self.tools.write().clear();

        for (name, client) in old {
            match Arc::try_unwrap(client) {
                Ok(client) => {
                    if let Err(e) = client.close().await {
                        self.logger
                            .warn(&format!("[ToolRegistry] Error closing '{}': {}", name, e));
                    }
                }
                // An in-flight call still holds the client; dropping our
                // handle closes the transport once it finishes
                Err(_) => self
                    .logger
                    .warn(&format!("[ToolRegistry] '{}' still in use, dropping handle", name)),
            }
        }
    }

    /// Refresh the tool cache from every connected server
    ///
    /// A server that fails to list its tools is logged and excluded; the
    /// aggregate call never fails.
    pub async fn refresh(&self) {
        let clients: Vec<(String, Arc<McpClient>)> = self
            .clients
            .read()
            .iter()
            .map(|(name, client)| (name.clone(), Arc::clone(client)))
            .collect();

        let mut new_tools = Vec::new();
        for (server, client) in clients {
            match client.list_tools().await {
                Ok(tools) => {
                    self.logger.info(&format!(
                        "[ToolRegistry] Discovered {} tools from '{}'",
                        tools.len(),
                        server
                    ));
                    for tool in tools {
                        new_tools.push(ToolInfo {
                            name: tool.name.to_string(),
                            description: tool
                                .description
                                .as_ref()
                                .map(|s| s.to_string())
                                .unwrap_or_default(),
                            input_schema: serde_json::to_value(tool.input_schema.as_ref())
                                .unwrap_or_default(),
                            server: server.clone(),
                        });
                    }
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "[ToolRegistry] Failed to fetch tools from '{}': {}",
                        server, e
                    ));
                }
            }
        }

        *self.tools.write() = new_tools;
    }

    /// Names of currently connected servers
    pub fn connected_servers(&self) -> Vec<String> {
        self.clients.read().keys().cloned().collect()
    }

    /// Look up a tool by name (first match across servers)
    pub fn find(&self, name: &str) -> Option<ToolInfo> {
        self.tools.read().iter().find(|t| t.name == name).cloned()
    }

    /// Get count of available tools
    pub fn tool_count(&self) -> usize {
        self.tools.read().len()
    }

    /// Call a tool on the server bound by its affinity tag
    pub async fn call_tool(&self, info: &ToolInfo, arguments: Value) -> Result<String, String> {
        let client = self.clients.read().get(&info.server).cloned();
        let client = client
            .ok_or_else(|| format!("No connected server '{}'", info.server))?;

        self.logger.info(&format!(
            "[ToolRegistry] Calling tool '{}' on '{}'",
            info.name, info.server
        ));

        let result = client
            .call_tool(&info.name, arguments)
            .await
            .map_err(|e| format!("Tool call failed: {}", e))?;

        Ok(normalize_tool_output(&result))
    }

    /// Seed the tool cache directly (hosts with static tools, tests)
    pub fn install_tools(&self, tools: Vec<ToolInfo>) {
        *self.tools.write() = tools;
    }
}

#[async_trait]
impl ToolBridge for ToolRegistry {
    fn catalog(&self) -> Vec<ToolInfo> {
        self.tools.read().clone()
    }

    fn llm_tools(&self) -> Vec<Tool> {
        self.tools.read().iter().map(Tool::from).collect()
    }

    /// Execute one tool call requested by the model
    ///
    /// Never fails: an unknown tool, a missing server or a failed call all
    /// become an error-text result fed back to the model, so the enclosing
    /// turn keeps going.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        let Some(info) = self.find(&tool_call.name) else {
            return ToolResult::error(
                &tool_call.id,
                &tool_call.name,
                format!("Error: tool '{}' is not available", tool_call.name),
            );
        };

        match self.call_tool(&info, tool_call.input.clone()).await {
            Ok(content) => ToolResult::success(&tool_call.id, &tool_call.name, content),
            Err(e) => ToolResult::error(&tool_call.id, &tool_call.name, format!("Error: {}", e)),
        }
    }
}

/// Normalize heterogeneous tool output into a single text blob
///
/// Textual content blocks are concatenated; anything without a text part
/// falls back to a JSON serialization of the raw content.
fn normalize_tool_output(result: &rmcp::model::CallToolResult) -> String {
    use rmcp::model::RawContent;

    let text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if !text.is_empty() {
        return text;
    }
    serde_json::to_string(&result.content).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn registry_with_tools() -> ToolRegistry {
        let registry = ToolRegistry::new(Arc::new(NoOpLogger));
        registry.install_tools(vec![
            ToolInfo {
                name: "read_document".to_string(),
                description: "Read a document".to_string(),
                input_schema: json!({"type": "object"}),
                server: "files".to_string(),
            },
            ToolInfo {
                name: "search_web".to_string(),
                description: "Search the web".to_string(),
                input_schema: json!({"type": "object"}),
                server: "web".to_string(),
            },
        ]);
        registry
    }

    #[test]
    fn test_catalog_and_find() {
        let registry = registry_with_tools();
        assert_eq!(registry.tool_count(), 2);
        assert_eq!(registry.llm_tools().len(), 2);

        let info = registry.find("search_web").unwrap();
        assert_eq!(info.server, "web");
        assert!(registry.find("nope").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_result() {
        let registry = registry_with_tools();
        let call = ToolCall::new("call_1", "does_not_exist", json!({}));

        let result = registry.execute_tool_call(&call).await;
        assert!(result.is_error);
        assert!(result.content.contains("not available"));
        assert_eq!(result.call_id, "call_1");
    }

    #[tokio::test]
    async fn test_disconnected_affinity_yields_error_result() {
        // Tools are cached but no server is connected anymore
        let registry = registry_with_tools();
        let call = ToolCall::new("call_2", "read_document", json!({"name": "a.md"}));

        let result = registry.execute_tool_call(&call).await;
        assert!(result.is_error);
        assert!(result.content.contains("No connected server 'files'"));
    }

    #[tokio::test]
    async fn test_teardown_clears_cache() {
        let registry = registry_with_tools();
        registry.teardown().await;
        assert_eq!(registry.tool_count(), 0);
        assert!(registry.connected_servers().is_empty());
    }

    #[tokio::test]
    async fn test_connect_reports_per_config_failures() {
        let registry = ToolRegistry::new(Arc::new(NoOpLogger));
        let configs = vec![
            ToolServerConfig::stdio("broken", "/nonexistent/tool-server", vec![]),
            ToolServerConfig::stdio("off", "/also/nonexistent", vec![]).disabled(),
        ];

        let statuses = registry.connect(&configs).await;
        // Disabled configs are skipped; the broken one reports its reason
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name(), "broken");
        assert!(!statuses[0].is_connected());
    }
}
