use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding, IndexEntry, ScoredChunk};

/// A read-only nearest-neighbour index over one corpus.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns up to `k` entries ordered by non-decreasing distance, ties in
    /// insertion order. `k` must be at least 1; larger than `len()` returns all.
    async fn query(&self, query: &Embedding, k: usize) -> Result<Vec<ScoredChunk>, DomainError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a complete index in one call. Nothing is exposed on failure.
#[async_trait]
pub trait IndexBuilder: Send + Sync {
    async fn build(&self, entries: Vec<IndexEntry>) -> Result<Arc<dyn VectorIndex>, DomainError>;
}
