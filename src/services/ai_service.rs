use anyhow::Result;

/// One prompt-in, text-out call to a language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub prompt: String,
}

/// Trait for AI providers (Anthropic, OpenRouter, etc.)
///
/// The credential is passed per call so the estimator stays the single owner
/// of configuration.
#[async_trait::async_trait]
pub trait AIService: Send + Sync {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String>;
}
