use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{info, warn};

use crate::domain::ports::{IndexBuilder, VectorIndex};
use crate::domain::{Chunk, DistanceMetric, DomainError, Embedding, IndexEntry, ScoredChunk};

const UPSERT_BATCH: usize = 256;

/// Builds indices backed by a Qdrant collection. Each build drops and
/// recreates the collection, so the index always reflects exactly one corpus.
pub struct QdrantIndexBuilder {
    client: Arc<Qdrant>,
    collection: String,
    dimension: usize,
    metric: DistanceMetric,
}

impl QdrantIndexBuilder {
    pub fn new(
        url: &str,
        collection: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::service(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            collection: collection.to_string(),
            dimension,
            metric,
        })
    }

    fn distance(&self) -> Distance {
        match self.metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
        }
    }

    async fn recreate_collection(&self, dimension: usize) -> Result<(), DomainError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::service(e.to_string()))?;

        if exists {
            self.client
                .delete_collection(&self.collection)
                .await
                .map_err(|e| DomainError::service(e.to_string()))?;
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(dimension as u64, self.distance()),
                ),
            )
            .await
            .map_err(|e| DomainError::service(e.to_string()))?;

        Ok(())
    }

    async fn populate(&self, entries: &[IndexEntry], dimension: usize) -> Result<(), DomainError> {
        let mut points = Vec::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.embedding.dimension() != dimension {
                return Err(DomainError::validation(format!(
                    "chunk {} has dimension {}, expected {dimension}",
                    entry.chunk.id,
                    entry.embedding.dimension()
                )));
            }
            points.push(PointStruct::new(
                position as u64,
                entry.embedding.as_slice().to_vec(),
                chunk_payload(&entry.chunk)?,
            ));
        }

        for batch in points.chunks(UPSERT_BATCH) {
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, batch.to_vec()).wait(true))
                .await
                .map_err(|e| DomainError::service(e.to_string()))?;
        }

        Ok(())
    }
}

fn chunk_payload(chunk: &Chunk) -> Result<Payload, DomainError> {
    let encoded =
        serde_json::to_string(chunk).map_err(|e| DomainError::internal(e.to_string()))?;

    serde_json::json!({
        "chunk": encoded,
        "text": chunk.text,
        "source": chunk.metadata.source,
    })
    .try_into()
    .map_err(|_| DomainError::internal("Failed to create payload"))
}

#[async_trait]
impl IndexBuilder for QdrantIndexBuilder {
    async fn build(&self, entries: Vec<IndexEntry>) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let dimension = entries
            .first()
            .map(|e| e.embedding.dimension())
            .unwrap_or(self.dimension);

        self.recreate_collection(dimension).await?;

        if let Err(e) = self.populate(&entries, dimension).await {
            warn!(collection = %self.collection, error = %e, "populate failed, dropping collection");
            if let Err(cleanup) = self.client.delete_collection(&self.collection).await {
                warn!(
                    collection = %self.collection,
                    error = %cleanup,
                    "failed to drop partial collection"
                );
            }
            return Err(e);
        }

        info!(collection = %self.collection, entries = entries.len(), "qdrant index built");

        Ok(Arc::new(QdrantVectorIndex {
            client: self.client.clone(),
            collection: self.collection.clone(),
            len: entries.len(),
            metric: self.metric,
        }))
    }
}

pub struct QdrantVectorIndex {
    client: Arc<Qdrant>,
    collection: String,
    len: usize,
    metric: DistanceMetric,
}

/// Qdrant reports similarity for cosine and raw distance for Euclid.
fn to_distance(metric: DistanceMetric, score: f32) -> f32 {
    match metric {
        DistanceMetric::Cosine => 1.0 - score,
        DistanceMetric::Euclidean => score,
    }
}

fn decode_point(
    point: ScoredPoint,
    metric: DistanceMetric,
) -> Result<(u64, ScoredChunk), DomainError> {
    let position = match point.id.and_then(|id| id.point_id_options) {
        Some(PointIdOptions::Num(n)) => n,
        Some(PointIdOptions::Uuid(id)) => {
            return Err(DomainError::internal(format!("unexpected uuid point id {id}")))
        }
        None => return Err(DomainError::internal("point without id")),
    };
    let encoded = point
        .payload
        .get("chunk")
        .and_then(|value| value.as_str())
        .ok_or_else(|| DomainError::internal(format!("point {position} has no chunk payload")))?;
    let chunk: Chunk = serde_json::from_str(encoded)
        .map_err(|e| DomainError::internal(format!("point {position}: {e}")))?;

    Ok((
        position,
        ScoredChunk {
            chunk,
            distance: to_distance(metric, point.score),
        },
    ))
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn query(&self, query: &Embedding, k: usize) -> Result<Vec<ScoredChunk>, DomainError> {
        if k == 0 {
            return Err(DomainError::validation("k must be at least 1"));
        }
        if self.len == 0 {
            return Ok(Vec::new());
        }

        let limit = k.min(self.len) as u64;
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), limit)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::service(e.to_string()))?;

        let mut results = response
            .result
            .into_iter()
            .map(|point| decode_point(point, self.metric))
            .collect::<Result<Vec<_>, _>>()?;

        // Point ids are insertion positions; use them to order equal distances.
        results.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance).then(a.0.cmp(&b.0)));

        Ok(results.into_iter().map(|(_, scored)| scored).collect())
    }

    fn len(&self) -> usize {
        self.len
    }
}
