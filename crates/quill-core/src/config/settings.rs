//! Process-wide settings with an explicit load/save lifecycle
//!
//! Settings are loaded at startup, saved on change, and always passed into
//! the orchestrator as a value so the chat loop stays testable with fixed
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Which model backend protocol to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Native chat-model protocol (generateContent wire shape)
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions protocol
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Transport used to reach a tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolTransport {
    /// Spawn a local process and speak over stdin/stdout
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Connect to a network streaming endpoint
    Http { url: String },
}

/// A configured external tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServerConfig {
    /// Unique name; doubles as the affinity tag on discovered tools
    pub name: String,
    /// Disabled servers are skipped on connect
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// How to reach the server
    pub transport: ToolTransport,
}

fn default_enabled() -> bool {
    true
}

impl ToolServerConfig {
    /// A stdio server spawned as a child process
    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            transport: ToolTransport::Stdio {
                command: command.into(),
                args,
            },
        }
    }

    /// A network streaming server
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            transport: ToolTransport::Http { url: url.into() },
        }
    }

    /// Disable the server
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Selected backend protocol
    #[serde(default)]
    pub provider: ProviderKind,
    /// Model identifier as used by the backend's API
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the model backend
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(rename = "apiBase", default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Reply language directive ("en", "de", ...)
    #[serde(default = "default_language")]
    pub language: String,
    /// Configured external tool servers
    #[serde(rename = "toolServers", default)]
    pub tool_servers: Vec<ToolServerConfig>,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            api_key: None,
            api_base: None,
            language: default_language(),
            tool_servers: Vec::new(),
        }
    }
}

impl Settings {
    /// Set the backend protocol
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// File-based settings store (YAML under the platform config directory)
pub struct FileSettingsStore {
    path: PathBuf,
    cache: RwLock<Option<Settings>>,
}

impl FileSettingsStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Default store location (`<config dir>/quill/config.yaml`)
    pub fn default_location() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("quill").join("config.yaml"))
    }

    /// Get the settings file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the settings file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_file(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Get cached settings, loading from disk on first access
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if let Some(settings) = self.cache.read().as_ref() {
            return Ok(settings.clone());
        }
        let settings = self.read_file()?;
        *self.cache.write() = Some(settings.clone());
        Ok(settings)
    }

    /// Reload settings from disk (invalidate cache)
    pub fn reload(&self) -> Result<Settings, ConfigError> {
        let settings = self.read_file()?;
        *self.cache.write() = Some(settings.clone());
        Ok(settings)
    }

    /// Persist settings and refresh the cache
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(settings)?;
        fs::write(&self.path, content)?;
        *self.cache.write() = Some(settings.clone());
        Ok(())
    }
}

impl std::fmt::Debug for FileSettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSettingsStore")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}
