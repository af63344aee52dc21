use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ai_service::{AIService, CompletionRequest};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// OpenAI-compatible chat completions through OpenRouter.
pub struct OpenRouterService {
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OpenRouterService {
    fn default() -> Self {
        Self::new()
    }
}

fn reply_text(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow::anyhow!("OpenRouter response contained no message content"))
}

#[async_trait::async_trait]
impl AIService for OpenRouterService {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
        };

        log::info!("🤖 Sending request to OpenRouter with model: {}", request.model);

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Health Tracker Calorie Estimator")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenRouter API error ({}): {}", status, error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        reply_text(chat_response)
    }
}
