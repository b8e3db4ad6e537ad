//! Subtask Processor
//!
//! Resolves one sub-task with a single inference call.

use crate::conductor::prompts;
use crate::conductor::sanitizer::truncate_chars;
use crate::conductor::types::error_output;
use crate::llm::InferenceClient;
use tracing::warn;

pub struct Processor {
    client: InferenceClient,
    context_chars: usize,
}

impl Processor {
    pub fn new(client: InferenceClient, context_chars: usize) -> Self {
        Self {
            client,
            context_chars,
        }
    }

    pub fn prompt_for(&self, subtask: &str, context: &str) -> String {
        prompts::subtask_prompt(subtask, truncate_chars(context, self.context_chars))
    }

    /// Returns the trimmed reply, or an `[ERROR] ...` string if the call fails.
    pub async fn process(&self, subtask: &str, context: &str) -> String {
        let prompt = self.prompt_for(subtask, context);

        match self.client.complete(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Sub-task failed: {}", e);
                error_output(e)
            }
        }
    }
}
