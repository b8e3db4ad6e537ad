//! Task Splitter
//!
//! Asks the model to decompose a task into 2-3 sub-tasks returned as JSON.
//! Any failure degrades to a single sub-task equal to the original task, so
//! the returned list is never empty.

use crate::conductor::prompts;
use crate::conductor::sanitizer::{sanitize_response, truncate_chars};
use crate::llm::InferenceClient;
use serde_json::Value;
use tracing::{debug, warn};

/// Why a model reply could not be turned into a sub-task list
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SplitFallback {
    #[error("no JSON object in response")]
    NoJson,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("missing \"subtasks\" key")]
    MissingKey,

    #[error("\"subtasks\" is not a list")]
    NotAList,

    #[error("\"subtasks\" is empty")]
    Empty,
}

pub struct Splitter {
    client: InferenceClient,
    context_chars: usize,
}

impl Splitter {
    pub fn new(client: InferenceClient, context_chars: usize) -> Self {
        Self {
            client,
            context_chars,
        }
    }

    pub fn prompt_for(&self, task: &str, context: &str) -> String {
        prompts::split_prompt(task, truncate_chars(context, self.context_chars))
    }

    /// Split `task` into ordered sub-tasks; never fails and never returns an empty list.
    pub async fn split(&self, task: &str, context: &str) -> Vec<String> {
        let prompt = self.prompt_for(task, context);

        let raw = match self.client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to split task, continuing with the whole task: {}", e);
                return vec![task.to_string()];
            }
        };

        match parse_subtasks(&raw) {
            Ok(subtasks) => {
                debug!("Model proposed {} sub-tasks", subtasks.len());
                subtasks
            }
            Err(reason) => {
                warn!("Could not read sub-tasks ({}), continuing with the whole task", reason);
                vec![task.to_string()]
            }
        }
    }
}

/// Parse the `subtasks` list out of a raw model reply.
///
/// The reply is sanitized, then the span from the first `{` to the last `}`
/// is parsed as JSON. String elements are kept verbatim; other elements are
/// kept as their compact JSON text.
pub fn parse_subtasks(raw: &str) -> Result<Vec<String>, SplitFallback> {
    let text = sanitize_response(raw);
    let json_str = extract_json_object(&text).ok_or(SplitFallback::NoJson)?;

    let data: Value = serde_json::from_str(json_str)
        .map_err(|e| SplitFallback::MalformedJson(e.to_string()))?;

    let items = match data.get("subtasks") {
        None => return Err(SplitFallback::MissingKey),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SplitFallback::NotAList),
    };

    if items.is_empty() {
        return Err(SplitFallback::Empty);
    }

    Ok(items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}

/// Greedy brace span: first `{` through last `}`.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
