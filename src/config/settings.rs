//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables consulted for the Gemini API key, in order
const API_KEY_ENV_VARS: &[&str] = &["TUBENOTES_GEMINI_API_KEY", "GEMINI_API_KEY"];

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Transcript source settings
    #[serde(default)]
    pub source: SourceSettings,

    /// Text generation settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Base URL of the transcript service
    #[serde(default = "default_source_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,

    /// User agent sent with transcript requests (empty = client default)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint override
    #[serde(default)]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Check credentials with a live call before serving requests
    #[serde(default)]
    pub verify_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions

fn default_source_endpoint() -> String {
    "https://www.youtube.com".to_string()
}

fn default_source_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    format!("{}/{}", crate::APP_NAME, crate::VERSION)
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_llm_timeout() -> u64 {
    45
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            endpoint: default_source_endpoint(),
            timeout_secs: default_source_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: String::new(),
            timeout_secs: default_llm_timeout(),
            verify_on_startup: false,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let mut settings = Self::load_from(&config_path)?;
        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Parse a specific configuration file, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_api_key_from(|name| std::env::var(name).ok());
    }

    fn apply_api_key_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if !self.llm.api_key.trim().is_empty() {
            return;
        }
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|key| !key.trim().is_empty())
        {
            self.llm.api_key = key;
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "tubenotes", "tubenotes")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Socket address string for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Copy with the API key masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.llm.api_key.is_empty() {
            copy.llm.api_key = "********".to_string();
        }
        copy
    }
}
