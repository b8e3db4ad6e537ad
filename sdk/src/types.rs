//! Pipeline result types
//!
//! Shared between the engine and anything consuming its structured output
//! (for example the `[JSON]` line printed by `rlm smart`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-reported confidence of an answer.
///
/// The inference service is never asked for a probability. The pipeline only
/// distinguishes three outcomes, each mapped to a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The inference call failed
    Failed,

    /// The model flagged its answer with the uncertainty marker
    Uncertain,

    /// The model answered without the marker, or the full pipeline completed
    Certain,
}

impl Confidence {
    /// Numeric value used for the early-exit comparison
    pub fn value(self) -> f64 {
        match self {
            Confidence::Failed => 0.0,
            Confidence::Uncertain => 0.5,
            Confidence::Certain => 0.95,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.value() * 100.0)
    }
}

/// Which branch produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Early exit from the fast path
    Fast,

    /// Split, process each sub-task, aggregate
    Full,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Fast => write!(f, "fast"),
            Mode::Full => write!(f, "full"),
        }
    }
}

/// Outcome of one smart-pipeline run
///
/// Serializes with the field names consumed by the chat integration
/// (`resposta`, `confianca`, `modo`, `tempo_ms`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "resposta")]
    pub answer: String,

    #[serde(rename = "confianca")]
    pub confidence: f64,

    #[serde(rename = "modo")]
    pub mode: Mode,

    #[serde(rename = "tempo_ms")]
    pub elapsed_ms: u64,
}

impl ResultRecord {
    pub fn new(
        answer: impl Into<String>,
        confidence: Confidence,
        mode: Mode,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            answer: answer.into(),
            confidence: confidence.value(),
            mode,
            elapsed_ms,
        }
    }
}
