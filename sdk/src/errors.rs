//! Error types and handling
//!
//! This module provides the error types used throughout the RLM engine.
//! All errors implement the `RlmErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Inference failures inside the conductor pipeline never reach this type:
//! they are absorbed by the component that made the call and surface only as
//! degraded output. `EngineError` covers the faults that do propagate to the
//! caller (configuration, context store, IO, interruption).

use thiserror::Error;

/// Trait for RLM error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait RlmErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around by the user.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RlmErrorExt};
///
/// let error = EngineError::ContextNotFound("usuario_123".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal = EngineError::Interrupted;
/// assert!(!fatal.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Context store errors
    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("Invalid context key: {0:?}")]
    InvalidContextKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Lifecycle
    #[error("Interrupted by user")]
    Interrupted,

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl RlmErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::ContextNotFound(_) => "No saved context for this key. Use 'rlm context list'",
            Self::InvalidContextKey(_) => {
                "Context keys must be plain names without path separators"
            }
            Self::Serialization(_) => "Stored metadata is not valid JSON",
            Self::Interrupted => "Operation cancelled",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Interrupted)
    }
}
