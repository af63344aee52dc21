use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ai_service::{AIService, CompletionRequest};

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client.
pub struct AnthropicService {
    client: reqwest::Client,
}

impl AnthropicService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AnthropicService {
    fn default() -> Self {
        Self::new()
    }
}

/// First text block of the reply.
fn reply_text(response: MessagesResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find(|block| block.block_type == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| anyhow::anyhow!("Anthropic response contained no text block"))
}

#[async_trait::async_trait]
impl AIService for AnthropicService {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        log::info!("🤖 Sending request to Anthropic with model: {}", request.model);

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Anthropic response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Anthropic API error ({}): {}", status, error_text);
            anyhow::bail!("Anthropic API error ({}): {}", status, error_text);
        }

        let messages_response: MessagesResponse = response.json().await?;
        reply_text(messages_response)
    }
}
