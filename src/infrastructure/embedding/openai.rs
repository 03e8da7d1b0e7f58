use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ports::Embedder, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;
use crate::infrastructure::openai_client::OpenAiClient;

pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient) -> Self {
        Self {
            client,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    pub fn from_config(client: OpenAiClient, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Restores input order and checks that every input got exactly one vector.
fn into_ordered(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Embedding>, DomainError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(DomainError::service(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }

    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(DomainError::service("embedding response has gaps in its indices"));
    }

    Ok(data.into_iter().map(|d| Embedding::new(d.embedding)).collect())
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, batch_size = texts.len(), "embedding batch");

        let response: EmbeddingResponse = self
            .client
            .post_json(
                "embeddings",
                &EmbeddingRequest {
                    model: &self.model,
                    input: texts,
                },
            )
            .await?;

        into_ordered(response, texts.len())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
