//! Conductor System
//!
//! Orchestrates task splitting, sub-task dispatch, result aggregation and the
//! fast-path early exit.

pub mod aggregator;
pub mod fast_path;
pub mod orchestrator;
pub mod processor;
pub mod prompts;
pub mod sanitizer;
pub mod splitter;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::Aggregator;
pub use fast_path::{FastPath, FastPathEstimate};
pub use orchestrator::{Conductor, SmartConductor, DEFAULT_CONFIDENCE_THRESHOLD};
pub use processor::Processor;
pub use sanitizer::{sanitize_response, truncate_chars};
pub use splitter::Splitter;
pub use types::{PipelineLimits, PipelineState};
