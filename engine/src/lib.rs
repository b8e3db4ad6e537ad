//! RLM Engine Library
//!
//! Recursive task decomposition over a local language model. This library is
//! used by both the `rlm` binary and the integration tests.

/// Configuration management module
pub mod config;

/// Inference provider abstraction layer
pub mod llm;

/// Pipeline orchestration module
pub mod conductor;

/// Flat-file per-user context store
pub mod context_store;

/// Local execution environment
pub mod repl;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
