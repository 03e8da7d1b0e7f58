use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{Generator, ResponseEnvelope, TokenUsage};
use crate::domain::DomainError;
use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::openai_client::OpenAiClient;

/// Chat-completions generator. The assembled prompt is sent as a single user
/// message.
pub struct OpenAiChat {
    client: OpenAiClient,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn from_config(client: OpenAiClient, config: &LlmConfig) -> Self {
        Self::new(client, config.model.clone()).with_temperature(config.temperature)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl TryFrom<ChatResponse> for ResponseEnvelope {
    type Error = DomainError;

    fn try_from(response: ChatResponse) -> Result<Self, Self::Error> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::service("completion returned no choices"))?;

        Ok(ResponseEnvelope {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            finish_reason: choice.finish_reason,
            usage: response.usage,
        })
    }
}

#[async_trait]
impl Generator for OpenAiChat {
    async fn generate(&self, prompt: &str) -> Result<ResponseEnvelope, DomainError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "chat completion");

        let response: ChatResponse = self
            .client
            .post_json(
                "chat/completions",
                &ChatRequest {
                    model: &self.model,
                    temperature: self.temperature,
                    messages: [ChatMessage {
                        role: "user",
                        content: prompt,
                    }],
                },
            )
            .await?;

        ResponseEnvelope::try_from(response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
