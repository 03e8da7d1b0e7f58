use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{DocumentLoader, Embedder, IndexBuilder, VectorIndex},
    Chunk, Document, DomainError, IndexEntry, TextSplitter,
};

pub const DEFAULT_EMBED_BATCH: usize = 100;

/// Build phase: documents → chunks → embeddings → index.
///
/// Any failure aborts the whole build; no partially populated index is
/// returned.
pub struct IndexingService {
    embedding: Arc<dyn Embedder>,
    builder: Arc<dyn IndexBuilder>,
    splitter: TextSplitter,
    batch_size: usize,
}

impl IndexingService {
    pub fn new(
        embedding: Arc<dyn Embedder>,
        builder: Arc<dyn IndexBuilder>,
        splitter: TextSplitter,
    ) -> Self {
        Self {
            embedding,
            builder,
            splitter,
            batch_size: DEFAULT_EMBED_BATCH,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[instrument(skip(self, loader), fields(path = %path.display()))]
    pub async fn index_source(
        &self,
        loader: &dyn DocumentLoader,
        path: &Path,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let documents = loader.load(path).await?;
        self.index_documents(&documents).await
    }

    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn index_documents(
        &self,
        documents: &[Document],
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let chunks = self.splitter.split_documents(documents);
        self.index_chunks(chunks).await
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn index_chunks(
        &self,
        chunks: Vec<Chunk>,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self.embedding.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(DomainError::service(format!(
                    "embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    batch.len()
                )));
            }

            entries.extend(
                embeddings
                    .into_iter()
                    .zip(batch.iter().cloned())
                    .map(|(embedding, chunk)| IndexEntry::new(embedding, chunk)),
            );
        }

        let index = self.builder.build(entries).await?;
        tracing::info!(entries = index.len(), "index built");
        Ok(index)
    }
}
