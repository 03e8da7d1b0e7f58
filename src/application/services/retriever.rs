use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{Embedder, VectorIndex},
    Chunk, DomainError, ScoredChunk,
};

pub const DEFAULT_TOP_K: usize = 6;

/// Similarity search over a built index with a fixed `k`.
#[derive(Clone)]
pub struct Retriever {
    embedding: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedding: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedding,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    #[instrument(skip(self, query), fields(top_k = self.top_k))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>, DomainError> {
        Ok(self
            .retrieve_scored(query)
            .await?
            .into_iter()
            .map(|r| r.chunk)
            .collect())
    }

    #[instrument(skip(self, query), fields(top_k = self.top_k))]
    pub async fn retrieve_scored(&self, query: &str) -> Result<Vec<ScoredChunk>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        let results = self.index.query(&embedding, self.top_k).await?;
        tracing::debug!(hits = results.len(), "retrieved");
        Ok(results)
    }
}
