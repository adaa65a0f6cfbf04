//! Configuration system for VoiceQuery
//!
//! Supports loading configuration from:
//! 1. CLI --config argument
//! 2. ~/.config/voicequery/config.{VOICEQUERY_ENV}.json
//! 3. Default values
//!
//! Where VOICEQUERY_ENV can be: production (default), development, test
//!
//! # Examples
//!
//! ```no_run
//! use voicequery::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! println!("Model: {} via {}", config.llm.model, config.llm.provider);
//! # Ok(())
//! # }
//! ```
//!
//! ```
//! use voicequery::config::{AppConfig, LlmConfig};
//!
//! let mut config = AppConfig::default();
//! config.llm = LlmConfig::anthropic();
//! config.llm.api_key = Some("ANTHROPIC_API_KEY".to_string());
//! config.validate().unwrap();
//! ```
//!
//! ## Environment Variables
//!
//! Environment variables override config file values:
//! - VOICEQUERY_PROVIDER
//! - VOICEQUERY_MODEL
//! - VOICEQUERY_LLM_URL
//! - VOICEQUERY_EXTRACTION
//! - OPENAI_API_KEY / ANTHROPIC_API_KEY (resolved on demand)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::prompt::DEFAULT_SYSTEM_PROMPT;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Supported LLM vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(ConfigError::ValidationError(format!(
                "Unknown provider: {}",
                s
            ))),
        }
    }
}

/// LLM endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,

    /// Base URL of the vendor API
    pub url: String,

    pub model: String,

    /// API key (can be environment variable name like "OPENAI_API_KEY")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    pub max_tokens: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

impl LlmConfig {
    /// gpt-3.5-turbo chat completions
    pub fn openai() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: Some("OPENAI_API_KEY".to_string()),
            temperature: Some(0.5),
            max_tokens: 1000,
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// claude-3-opus messages API
    pub fn anthropic() -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            api_key: Some("ANTHROPIC_API_KEY".to_string()),
            temperature: None,
            max_tokens: 1024,
            request_timeout_secs: default_request_timeout(),
        }
    }

    pub fn for_provider(provider: LlmProvider) -> Self {
        match provider {
            LlmProvider::OpenAI => Self::openai(),
            LlmProvider::Anthropic => Self::anthropic(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "URL cannot be empty".to_string(),
            ));
        }

        if self.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "Model name cannot be empty".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.api_key.is_none() {
            return Err(ConfigError::ValidationError(format!(
                "API key required for {} provider",
                self.provider
            )));
        }

        Ok(())
    }

    /// Resolve API key from environment variable if needed
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().and_then(|key| {
            // If the key looks like an env var name, try to resolve it
            if key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
                std::env::var(key).ok()
            } else {
                Some(key.clone())
            }
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::openai()
    }
}

/// Optional Snowflake session settings applied at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,

    #[serde(default = "default_warehouse_timeout")]
    pub timeout_secs: u64,
}

fn default_warehouse_timeout() -> u64 {
    30
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            role: None,
            warehouse: None,
            timeout_secs: default_warehouse_timeout(),
        }
    }
}

/// How the SQL statement is carved out of the model reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Skip a fixed four characters past the first "sql"
    Offset,
    /// Fenced block, "SQL:" label, or bare "sql" marker
    #[default]
    Marker,
}

impl std::str::FromStr for ExtractionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offset" | "legacy" => Ok(Self::Offset),
            "marker" | "fenced" => Ok(Self::Marker),
            _ => Err(ConfigError::ValidationError(format!(
                "Unknown extraction strategy: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub strategy: ExtractionStrategy,

    /// Upper-case the extracted statement. Mangles case-sensitive literals.
    #[serde(default = "default_true")]
    pub normalize_case: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::default(),
            normalize_case: true,
        }
    }
}

/// What the manual SQL editor is pre-filled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ManualPrefill {
    /// Always the last generated query
    #[default]
    LastGenerated,
    /// The last attempted query, only after a failed execution
    OnFailure,
    Never,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// System-role message sent before every instruction
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default)]
    pub manual_prefill: ManualPrefill,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            warehouse: WarehouseConfig::default(),
            extraction: ExtractionConfig::default(),
            system_prompt: default_system_prompt(),
            manual_prefill: ManualPrefill::default(),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration with standard priority:
    /// 1. Explicit path
    /// 2. ~/.config/voicequery/config.{VOICEQUERY_ENV}.json
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::locate(explicit_path)? {
            Some(path) => Self::from_file(path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// File `load` would read, `None` when it falls back to defaults.
    ///
    /// Does no logging, so callers can resolve the path before a subscriber
    /// is installed and report it afterwards.
    pub fn locate(explicit_path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = explicit_path {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ConfigError::ValidationError(format!(
                "Config file not found: {:?}",
                path
            )));
        }

        let env = std::env::var("VOICEQUERY_ENV").unwrap_or_else(|_| "production".to_string());

        Ok(Self::config_dir()
            .map(|dir| dir.join(format!("config.{}.json", env)))
            .filter(|path| path.exists()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // Switching vendor swaps in that vendor's preset before the finer overrides
        if let Ok(provider) = std::env::var("VOICEQUERY_PROVIDER") {
            let provider: LlmProvider = provider.parse()?;
            if provider != self.llm.provider {
                self.llm = LlmConfig::for_provider(provider);
            }
        }

        if let Ok(model) = std::env::var("VOICEQUERY_MODEL") {
            self.llm.model = model;
        }

        if let Ok(url) = std::env::var("VOICEQUERY_LLM_URL") {
            self.llm.url = url;
        }

        if let Ok(strategy) = std::env::var("VOICEQUERY_EXTRACTION") {
            self.extraction.strategy = strategy.parse()?;
        }

        // API keys are resolved on-demand via resolve_api_key()
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;

        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "system_prompt cannot be empty".to_string(),
            ));
        }

        if self.warehouse.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "warehouse.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("voicequery"))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
