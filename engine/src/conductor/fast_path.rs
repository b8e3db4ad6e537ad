//! Fast-Path Estimator
//!
//! One direct answer attempt. The model is asked to prefix its reply with
//! `[UNCERTAIN]` when it is not sure; the presence of that marker is the only
//! confidence signal available.

use crate::conductor::prompts::{self, UNCERTAIN_MARKER};
use crate::conductor::sanitizer::{sanitize_response, truncate_chars};
use crate::llm::InferenceClient;
use sdk::Confidence;
use tracing::{info, warn};

/// Answer and self-reported confidence from the fast path
#[derive(Debug, Clone, PartialEq)]
pub struct FastPathEstimate {
    /// `None` when the call itself failed
    pub answer: Option<String>,
    pub confidence: Confidence,
}

impl FastPathEstimate {
    /// Classify a raw model reply by the leading marker.
    pub fn from_reply(raw: &str) -> Self {
        let text = sanitize_response(raw);

        if text.starts_with(UNCERTAIN_MARKER) {
            Self {
                answer: Some(text.replace(UNCERTAIN_MARKER, "").trim().to_string()),
                confidence: Confidence::Uncertain,
            }
        } else {
            Self {
                answer: Some(text),
                confidence: Confidence::Certain,
            }
        }
    }

    fn failed() -> Self {
        Self {
            answer: None,
            confidence: Confidence::Failed,
        }
    }

    /// Whether this estimate allows skipping the full pipeline
    pub fn qualifies_for_early_exit(&self, threshold: f64) -> bool {
        self.confidence.value() >= threshold
            && self.answer.as_deref().is_some_and(|a| !a.is_empty())
    }
}

pub struct FastPath {
    client: InferenceClient,
    context_chars: usize,
}

impl FastPath {
    pub fn new(client: InferenceClient, context_chars: usize) -> Self {
        Self {
            client,
            context_chars,
        }
    }

    pub async fn estimate(&self, task: &str, context: &str) -> FastPathEstimate {
        let prompt = prompts::fast_path_prompt(task, truncate_chars(context, self.context_chars));

        match self.client.complete(&prompt).await {
            Ok(raw) => {
                let estimate = FastPathEstimate::from_reply(&raw);
                match estimate.confidence {
                    Confidence::Uncertain => info!("[FastPath] Low confidence"),
                    _ => info!("[FastPath] High confidence ({})", estimate.confidence),
                }
                estimate
            }
            Err(e) => {
                warn!("Fast path failed: {}", e);
                FastPathEstimate::failed()
            }
        }
    }
}
