//! Integration tests for configuration management
//!
//! These tests verify that a config file on disk is loaded, defaulted,
//! validated and path-expanded.

use std::path::PathBuf;
use tempfile::TempDir;

use rlm_engine::config::Config;
use rlm_engine::conductor::PipelineLimits;
use sdk::errors::EngineError;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_toml_parsing() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let path = write_config(
        &temp_dir,
        &format!(
            r#"
[core]
log_level = "debug"
data_dir = "{}"

[llm]
request_timeout_secs = 120

[llm.ollama]
base_url = "http://localhost:11434"
model = "qwen3:4b"

[pipeline]
split_context_chars = 300
subtask_context_chars = 1500
result_excerpt_chars = 200
fast_path_context_chars = 400

[context_store]
base_dir = "~/.rlm/contextos"
"#,
            data_dir.display()
        ),
    );

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.llm.request_timeout_secs, Some(120));
    assert_eq!(config.pipeline.split_context_chars, 300);
    assert_eq!(config.pipeline.subtask_context_chars, 1500);
    assert!(data_dir.is_dir(), "data directory should be created");

    let home = dirs::home_dir().unwrap();
    assert_eq!(config.context_dir(), home.join(".rlm/contextos"));

    let limits = PipelineLimits::from(&config.pipeline);
    assert_eq!(limits.result_excerpt_chars, 200);
    assert_eq!(limits.fast_path_context_chars, 400);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        &format!(
            "[core]\ndata_dir = \"{}\"\n",
            temp_dir.path().join("data").display()
        ),
    );

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.core.log_level, "info");
    assert_eq!(config.context_dir(), temp_dir.path().join("data").join("contextos"));
    assert_eq!(PipelineLimits::from(&config.pipeline), PipelineLimits::default());
}

#[test]
fn test_invalid_log_level() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "[core]\nlog_level = \"loud\"\n");

    let result = Config::load_from_path(&path);
    assert!(matches!(result, Err(EngineError::Config(msg)) if msg.contains("loud")));
}

#[test]
fn test_threshold_out_of_range() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "[pipeline]\nconfidence_threshold = 1.5\n");

    // RLM_CONFIDENCE_THRESHOLD, when set, would replace the file value
    if std::env::var("RLM_CONFIDENCE_THRESHOLD").is_ok() {
        return;
    }

    let result = Config::load_from_path(&path);
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_malformed_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "[pipeline\nconfidence_threshold = ");

    let result = Config::load_from_path(&path);
    assert!(matches!(result, Err(EngineError::Config(msg)) if msg.contains("parse")));
}

#[test]
fn test_missing_file() {
    let result = Config::load_from_path(std::path::Path::new("/nonexistent/rlm/config.toml"));
    assert!(matches!(result, Err(EngineError::Config(msg)) if msg.contains("read")));
}
