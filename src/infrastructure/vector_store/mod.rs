mod in_memory;
mod qdrant;

pub use in_memory::{InMemoryIndexBuilder, InMemoryVectorIndex};
pub use qdrant::{QdrantIndexBuilder, QdrantVectorIndex};
