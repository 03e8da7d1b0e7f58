mod document;
mod embedding;
mod index;
mod prompt;

pub use document::{Chunk, Document, Metadata};
pub use embedding::{DistanceMetric, Embedding};
pub use index::{IndexEntry, ScoredChunk};
pub use prompt::{
    PromptPayload, PromptTemplate, CONTEXT_PLACEHOLDER, DEFAULT_RAG_TEMPLATE, QUESTION_PLACEHOLDER,
};
