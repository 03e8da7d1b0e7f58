use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a piece of text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    /// Zero-based page index, present only for paged sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl Metadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page: None,
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

/// One logical unit of a source: a whole text file, or a single PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text: String,
    pub chunk_index: usize,
    pub metadata: Metadata,
}

impl Chunk {
    /// Builds a chunk that inherits `document`'s metadata as-is.
    pub fn from_document(document: &Document, text: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document.id,
            text: text.into(),
            chunk_index,
            metadata: document.metadata.clone(),
        }
    }
}
