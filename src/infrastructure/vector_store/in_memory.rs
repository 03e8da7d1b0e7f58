use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{IndexBuilder, VectorIndex};
use crate::domain::{DistanceMetric, DomainError, Embedding, IndexEntry, ScoredChunk};

/// Exact nearest-neighbour search over entries held in memory.
///
/// Immutable after construction, so concurrent queries need no locking.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
    metric: DistanceMetric,
}

impl InMemoryVectorIndex {
    pub fn build(entries: Vec<IndexEntry>, metric: DistanceMetric) -> Result<Self, DomainError> {
        let dimension = entries.first().map(|e| e.embedding.dimension()).unwrap_or(0);

        if let Some(first) = entries.first() {
            if dimension == 0 {
                return Err(DomainError::validation(format!(
                    "chunk {} has an empty embedding",
                    first.chunk.id
                )));
            }
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.dimension() != dimension) {
            return Err(DomainError::validation(format!(
                "chunk {} has dimension {}, expected {dimension}",
                bad.chunk.id,
                bad.embedding.dimension()
            )));
        }

        Ok(Self {
            entries,
            dimension,
            metric,
        })
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query(&self, query: &Embedding, k: usize) -> Result<Vec<ScoredChunk>, DomainError> {
        if k == 0 {
            return Err(DomainError::validation("k must be at least 1"));
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.dimension() != self.dimension {
            return Err(DomainError::validation(format!(
                "query has dimension {}, index has {}",
                query.dimension(),
                self.dimension
            )));
        }

        let mut results: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, self.metric.distance(query, &entry.embedding)))
            .collect();

        // Stable sort keeps insertion order among equal distances.
        results.sort_by(|a, b| a.1.total_cmp(&b.1));

        Ok(results
            .into_iter()
            .take(k)
            .map(|(i, distance)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryIndexBuilder {
    metric: DistanceMetric,
}

impl InMemoryIndexBuilder {
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }
}

#[async_trait]
impl IndexBuilder for InMemoryIndexBuilder {
    async fn build(&self, entries: Vec<IndexEntry>) -> Result<Arc<dyn VectorIndex>, DomainError> {
        Ok(Arc::new(InMemoryVectorIndex::build(entries, self.metric)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chunk, Document, Metadata};

    fn entry(text: &str, vector: Vec<f32>) -> IndexEntry {
        let doc = Document::new(text, Metadata::new("test.txt"));
        IndexEntry::new(Embedding::new(vector), Chunk::from_document(&doc, text, 0))
    }

    fn five_entries() -> Vec<IndexEntry> {
        vec![
            entry("east", vec![1.0, 0.0]),
            entry("north", vec![0.0, 1.0]),
            entry("west", vec![-1.0, 0.0]),
            entry("south", vec![0.0, -1.0]),
            entry("north-east", vec![1.0, 1.0]),
        ]
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let index = InMemoryVectorIndex::build(five_entries(), DistanceMetric::Cosine).unwrap();
        let results = index.query(&Embedding::new(vec![1.0, 0.1]), 3).await.unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "north-east", "north"]);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_k_larger_than_index_returns_everything() {
        let index = InMemoryVectorIndex::build(five_entries(), DistanceMetric::Cosine).unwrap();
        let results = index.query(&Embedding::new(vec![0.0, 1.0]), 6).await.unwrap();

        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let entries = vec![
            entry("first", vec![1.0, 0.0]),
            entry("second", vec![1.0, 0.0]),
            entry("third", vec![1.0, 0.0]),
        ];
        let index = InMemoryVectorIndex::build(entries, DistanceMetric::Euclidean).unwrap();
        let results = index.query(&Embedding::new(vec![1.0, 0.0]), 3).await.unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_repeated_queries_are_identical() {
        let index = InMemoryVectorIndex::build(five_entries(), DistanceMetric::Euclidean).unwrap();
        let query = Embedding::new(vec![0.3, -0.7]);

        let a = index.query(&query, 4).await.unwrap();
        let b = index.query(&query, 4).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_zero_k_is_rejected() {
        let index = InMemoryVectorIndex::build(five_entries(), DistanceMetric::Cosine).unwrap();
        assert!(matches!(
            index.query(&Embedding::new(vec![1.0, 0.0]), 0).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_rejected() {
        let index = InMemoryVectorIndex::build(five_entries(), DistanceMetric::Cosine).unwrap();
        assert!(matches!(
            index.query(&Embedding::new(vec![1.0, 0.0, 0.0]), 1).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let entries = vec![entry("a", vec![1.0, 0.0]), entry("b", vec![1.0])];
        assert!(matches!(
            InMemoryVectorIndex::build(entries, DistanceMetric::Cosine),
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = InMemoryIndexBuilder::default().build(Vec::new()).await.unwrap();

        assert!(index.is_empty());
        assert!(index.query(&Embedding::new(vec![1.0]), 3).await.unwrap().is_empty());
    }
}
