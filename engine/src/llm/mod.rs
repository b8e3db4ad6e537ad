//! LLM Provider Abstraction Layer
//!
//! The conductor pipeline depends on a single capability:
//! `generate(model, prompt) -> text`. The `LLMProvider` trait is that
//! capability; `InferenceClient` binds a provider to a model and is the
//! handle every conductor component receives. Passing the client explicitly
//! keeps the pipeline testable against a scripted provider.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod ollama;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "ollama")
    fn name(&self) -> &str;

    /// Generate a completion for a single prompt
    ///
    /// # Returns
    /// * `Ok(String)` - the raw text field of the provider's response
    /// * `Err(LLMError)` - if the request fails
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Check if the provider is currently healthy and available
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}

/// A provider bound to one model.
///
/// Cloning is cheap; all clones share the same provider.
#[derive(Clone)]
pub struct InferenceClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl InferenceClient {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send one prompt and return the raw response text
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            "Inference request: provider={}, model={}, prompt_chars={}",
            self.provider.name(),
            self.model,
            prompt.chars().count()
        );
        self.provider.generate(&self.model, prompt).await
    }

    pub async fn check_health(&self) -> bool {
        self.provider.check_health().await
    }
}

impl fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoProvider {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            Ok(format!("echo: {}", prompt))
        }
    }

    #[tokio::test]
    async fn test_client_forwards_model_and_prompt() {
        let provider = Arc::new(EchoProvider {
            seen: Mutex::new(Vec::new()),
        });
        let client = InferenceClient::new(provider.clone(), "qwen3:4b");

        let text = client.complete("hello").await.unwrap();

        assert_eq!(text, "echo: hello");
        assert_eq!(client.model(), "qwen3:4b");
        assert_eq!(client.provider_name(), "echo");
        assert!(client.check_health().await);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("qwen3:4b".to_string(), "hello".to_string())]);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(LLMError::Timeout.to_string(), "Timeout");
        assert_eq!(
            LLMError::NetworkError("reset".into()).to_string(),
            "Network error: reset"
        );
    }
}
