pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod openai_client;
pub mod vector_store;

pub use config::{AppConfig, Config, Credential, IndexBackend, PromptsConfig};
pub use embedding::OpenAiEmbedder;
pub use llm::OpenAiChat;
pub use loader::{load_source, PdfLoader, SourceKind, TextLoader};
pub use openai_client::OpenAiClient;
pub use vector_store::{
    InMemoryIndexBuilder, InMemoryVectorIndex, QdrantIndexBuilder, QdrantVectorIndex,
};
