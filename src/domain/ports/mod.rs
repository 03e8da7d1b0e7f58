mod embedding;
mod generator;
mod loader;
mod vector_index;

pub use embedding::Embedder;
pub use generator::{Generator, ResponseEnvelope, TokenUsage};
pub use loader::DocumentLoader;
pub use vector_index::{IndexBuilder, VectorIndex};
