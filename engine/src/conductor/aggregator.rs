//! Result Aggregator
//!
//! Folds positional `(sub-task, result)` pairs into one final answer.

use crate::conductor::prompts;
use crate::conductor::sanitizer::truncate_chars;
use crate::conductor::types::error_output;
use crate::llm::InferenceClient;
use tracing::warn;

pub struct Aggregator {
    client: InferenceClient,
    excerpt_chars: usize,
}

impl Aggregator {
    pub fn new(client: InferenceClient, excerpt_chars: usize) -> Self {
        Self {
            client,
            excerpt_chars,
        }
    }

    /// Pairs by position; excess elements of the longer list are dropped.
    pub fn prompt_for<S: AsRef<str>, R: AsRef<str>>(
        &self,
        subtasks: &[S],
        results: &[R],
        original_task: &str,
    ) -> String {
        if subtasks.len() != results.len() {
            warn!(
                "Aggregating {} sub-tasks against {} results; unmatched entries are dropped",
                subtasks.len(),
                results.len()
            );
        }

        let pairs: Vec<(&str, &str)> = subtasks
            .iter()
            .zip(results.iter())
            .map(|(s, r)| (s.as_ref(), truncate_chars(r.as_ref(), self.excerpt_chars)))
            .collect();

        prompts::aggregation_prompt(original_task, &pairs)
    }

    pub async fn aggregate<S: AsRef<str>, R: AsRef<str>>(
        &self,
        subtasks: &[S],
        results: &[R],
        original_task: &str,
    ) -> String {
        let prompt = self.prompt_for(subtasks, results, original_task);

        match self.client.complete(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Aggregation failed: {}", e);
                error_output(e)
            }
        }
    }
}
