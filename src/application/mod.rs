//! Application layer - Use cases and orchestration.

pub mod format;
pub mod services;

pub use format::{format_context, parse_response};
pub use services::{IndexingService, RagAnswer, RagService, Retriever, DEFAULT_TOP_K};
