use serde::{Deserialize, Serialize};

use super::{Chunk, Embedding};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub embedding: Embedding,
    pub chunk: Chunk,
}

impl IndexEntry {
    pub fn new(embedding: Embedding, chunk: Chunk) -> Self {
        Self { embedding, chunk }
    }
}

/// A query hit. Lower `distance` means a closer match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}
