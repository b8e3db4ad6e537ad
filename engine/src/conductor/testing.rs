//! Scripted provider for conductor unit tests.

use crate::llm::{InferenceClient, LLMError, LLMProvider, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued replies in order and records every prompt it receives.
/// An exhausted queue answers with a connection failure.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: &Arc<Self>, text: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        Arc::clone(self)
    }

    pub fn fail(self: &Arc<Self>) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(LLMError::ProviderUnavailable("connection refused".into())));
        Arc::clone(self)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn client(self: &Arc<Self>) -> InferenceClient {
        InferenceClient::new(Arc::clone(self) as Arc<dyn LLMProvider>, "test-model")
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::ProviderUnavailable("script exhausted".into())))
    }
}
