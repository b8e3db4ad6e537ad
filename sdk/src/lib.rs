//! RLM SDK
//!
//! Shared error and result types for the RLM engine and the tools that
//! consume its output.

/// Error types and handling
pub mod errors;

/// Pipeline result types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, RlmErrorExt};
pub use types::{Confidence, Mode, ResultRecord};
