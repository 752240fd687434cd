//! Application configuration loaded from TOML.

use crate::error::PiError;
use crate::llm_client::{LlmConfig, LlmProvider};
use can_you_pi_core::{DEFAULT_MAX_POSITION, DigitSource};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Top-level configuration.
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    host: String,

    /// Port the HTTP server binds to.
    port: u16,

    /// Digit file to load instead of the bundled digits.
    digits_path: Option<PathBuf>,

    /// Upper bound for randomly drawn quiz positions.
    quiz_max_position: usize,

    /// Idle time after which sessions and conversations are dropped (0 disables).
    session_idle_timeout_secs: u64,

    /// Chat model settings.
    llm: LlmSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            digits_path: None,
            quiz_max_position: DEFAULT_MAX_POSITION,
            session_idle_timeout_secs: 3600,
            llm: LlmSettings::default(),
        }
    }
}

/// `[llm]` table.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenAI-compatible provider.
    provider: LlmProvider,

    /// Model name.
    model: String,

    /// Maximum tokens per completion.
    max_tokens: u32,

    /// Sampling temperature.
    temperature: f32,

    /// Request timeout in seconds (0 disables).
    timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 1500,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl LlmSettings {
    /// Builds an LLM client configuration, reading the provider's API key
    /// from the environment (`GROQ_API_KEY` or `OPENAI_API_KEY`).
    #[instrument(skip(self), fields(provider = ?self.provider, model = %self.model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");
        let var = self.provider.api_key_var();
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::new(format!("{var} environment variable not set")))?;

        Ok(LlmConfig::new(
            self.provider,
            api_key,
            self.model.clone(),
            self.max_tokens,
            self.temperature,
            Duration::from_secs(self.timeout_secs),
        ))
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Replaces the bind address.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Loads the configured digit file, or the bundled digits.
    #[instrument(skip(self))]
    pub fn digit_source(&self) -> Result<DigitSource, ConfigError> {
        let source = match &self.digits_path {
            Some(path) => DigitSource::load(path),
            None => DigitSource::embedded(),
        };
        source.map_err(|e| ConfigError::new(format!("Failed to load digits: {}", e)))
    }

    /// Idle timeout, or `None` when eviction is disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.session_idle_timeout_secs))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<ConfigError> for PiError {
    #[track_caller]
    fn from(err: ConfigError) -> Self {
        PiError::configuration(err.message)
    }
}
