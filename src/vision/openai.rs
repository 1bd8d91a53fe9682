//! OpenAI chat completions client for image description

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionClient, ConversationTurn};
use crate::{Error, Result};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default vision-capable model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI vision completion client
pub struct OpenAiVision {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiVision {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for vision".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            endpoint: OPENAI_CHAT_URL.to_string(),
        })
    }

    /// Create with a specific model
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Point at an OpenAI-compatible endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl CompletionClient for OpenAiVision {
    async fn complete(&self, messages: &[ConversationTurn], max_tokens: u32) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Vision(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Vision(format!("OpenAI API error {status}: {body}")));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Vision(format!("Failed to parse OpenAI response: {e}")))?;

        let text = reply_text(result)?;
        tracing::debug!(model = %self.model, chars = text.len(), "image described");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai-vision"
    }
}

/// Pull the first choice's text out of a response
fn reply_text(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::Vision("Empty response from vision API".to_string()))
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
