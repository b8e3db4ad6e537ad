//! Configuration management
//!
//! This module handles loading, validation, and management of the RLM configuration.
//! Configuration is stored in TOML format at ~/.rlm/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory
//! - **llm**: Ollama endpoint, model and request timeout
//! - **pipeline**: Confidence threshold and prompt truncation limits
//! - **context_store**: Where per-user context files live (defaults to
//!   `<data_dir>/contextos`)
//!
//! Every field has a default, so a partial file (or an empty one) is valid.
//!
//! # Environment Overrides
//!
//! After the file is parsed, `OLLAMA_HOST`, `RLM_MODEL` and
//! `RLM_CONFIDENCE_THRESHOLD` replace the corresponding values when set.
//!
//! # Examples
//!
//! ```no_run
//! use rlm_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Model: {}", config.llm.ollama.model);
//! println!("Threshold: {}", config.pipeline.confidence_threshold);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_MODEL: &str = "RLM_MODEL";
pub const ENV_CONFIDENCE_THRESHOLD: &str = "RLM_CONFIDENCE_THRESHOLD";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Inference backend configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Context store location
    #[serde(default)]
    pub context_store: ContextStoreConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Inference backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Per-request timeout in seconds. Unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Ollama provider settings
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl LLMConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum fast-path confidence for an early exit (0.0-1.0)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Context characters shown to the splitter
    #[serde(default = "default_split_context_chars")]
    pub split_context_chars: usize,

    /// Context characters shown with each sub-task
    #[serde(default = "default_subtask_context_chars")]
    pub subtask_context_chars: usize,

    /// Characters of each sub-task result shown to the aggregator
    #[serde(default = "default_result_excerpt_chars")]
    pub result_excerpt_chars: usize,

    /// Context characters shown to the fast path
    #[serde(default = "default_fast_path_context_chars")]
    pub fast_path_context_chars: usize,
}

/// Context store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextStoreConfig {
    /// Base directory (supports ~ expansion). Unset means `<data_dir>/contextos`;
    /// always set after `validate_and_process`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.rlm")
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:4b".to_string()
}

fn default_confidence_threshold() -> f64 {
    0.90
}

fn default_split_context_chars() -> usize {
    500
}

fn default_subtask_context_chars() -> usize {
    2000
}

fn default_result_excerpt_chars() -> usize {
    500
}

fn default_fast_path_context_chars() -> usize {
    500
}

/// Directory under `data_dir` that holds the context store by default
pub const CONTEXT_SUBDIR: &str = "contextos";

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            split_context_chars: default_split_context_chars(),
            subtask_context_chars: default_subtask_context_chars(),
            result_excerpt_chars: default_result_excerpt_chars(),
            fast_path_context_chars: default_fast_path_context_chars(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.rlm/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails (bad log level, threshold or limits)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env_overrides()?;
        config.validate_and_process()?;

        Ok(config)
    }

    /// Parse configuration text without touching the environment or disk
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        // The file gets the plain defaults; overrides apply to this run only
        let toml_string = toml::to_string_pretty(&Self::default())
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.rlm/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".rlm").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) -> Result<(), EngineError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_OLLAMA_HOST).filter(|v| !v.trim().is_empty()) {
            self.llm.ollama.base_url = normalize_host(host.trim());
        }

        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.llm.ollama.model = model.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_CONFIDENCE_THRESHOLD) {
            self.pipeline.confidence_threshold = raw.trim().parse().map_err(|_| {
                EngineError::Config(format!(
                    "{} must be a number, got '{}'",
                    ENV_CONFIDENCE_THRESHOLD, raw
                ))
            })?;
        }

        Ok(())
    }

    /// Validate and process configuration
    ///
    /// Checks the log level, threshold range and truncation limits, expands
    /// `~` in paths and creates the data directory.
    pub fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        validate_threshold(self.pipeline.confidence_threshold)?;

        let limits = [
            ("split_context_chars", self.pipeline.split_context_chars),
            ("subtask_context_chars", self.pipeline.subtask_context_chars),
            ("result_excerpt_chars", self.pipeline.result_excerpt_chars),
            ("fast_path_context_chars", self.pipeline.fast_path_context_chars),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(EngineError::Config(format!(
                "{} must be greater than 0",
                name
            )));
        }

        if self.llm.ollama.model.trim().is_empty() {
            return Err(EngineError::Config("llm.ollama.model must not be empty".to_string()));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        let base_dir = match &self.context_store.base_dir {
            Some(dir) => expand_path(dir)?,
            None => self.core.data_dir.join(CONTEXT_SUBDIR),
        };
        self.context_store.base_dir = Some(base_dir);

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }

    /// Context store directory: the configured one, else `<data_dir>/contextos`
    pub fn context_dir(&self) -> PathBuf {
        self.context_store
            .base_dir
            .clone()
            .unwrap_or_else(|| self.core.data_dir.join(CONTEXT_SUBDIR))
    }
}

/// Check that a confidence threshold lies in [0, 1]
pub fn validate_threshold(threshold: f64) -> Result<(), EngineError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EngineError::Config(format!(
            "confidence_threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}

/// `OLLAMA_HOST` is often given as a bare `host:port`
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// Expand ~ in path to user's home directory
pub fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
