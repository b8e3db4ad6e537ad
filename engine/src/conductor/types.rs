//! Conductor types shared by the pipeline stages.

use crate::config::PipelineConfig;
use std::fmt;

/// Character limits applied to context and results before embedding them in prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineLimits {
    pub split_context_chars: usize,
    pub subtask_context_chars: usize,
    pub result_excerpt_chars: usize,
    pub fast_path_context_chars: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            split_context_chars: 500,
            subtask_context_chars: 2000,
            result_excerpt_chars: 500,
            fast_path_context_chars: 500,
        }
    }
}

impl From<&PipelineConfig> for PipelineLimits {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            split_context_chars: config.split_context_chars,
            subtask_context_chars: config.subtask_context_chars,
            result_excerpt_chars: config.result_excerpt_chars,
            fast_path_context_chars: config.fast_path_context_chars,
        }
    }
}

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    FastAttempt,
    EarlyExit,
    FullPipeline,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "START",
            PipelineState::FastAttempt => "FAST_ATTEMPT",
            PipelineState::EarlyExit => "EARLY_EXIT",
            PipelineState::FullPipeline => "FULL_PIPELINE",
            PipelineState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Prefix of every degraded stage output produced by a failed inference call
pub const ERROR_PREFIX: &str = "[ERROR]";

pub(crate) fn error_output(detail: impl fmt::Display) -> String {
    format!("{} {}", ERROR_PREFIX, detail)
}
