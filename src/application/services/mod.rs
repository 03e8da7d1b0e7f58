mod indexing;
mod rag;
mod retriever;

pub use indexing::IndexingService;
pub use rag::{RagAnswer, RagService};
pub use retriever::{Retriever, DEFAULT_TOP_K};
