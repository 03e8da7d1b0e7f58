use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::domain::chunking::{default_separators, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::domain::{
    DistanceMetric, DomainError, PromptTemplate, Result, TextSplitter, DEFAULT_RAG_TEMPLATE,
};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const CONFIG_PATH_ENV: &str = "RAG_CONFIG";

/// API key for the hosted services. Never printed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| DomainError::config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            DomainError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Startup-time loading: the YAML file named by `RAG_CONFIG` (if any), then
    /// the credential from `OPENAI_API_KEY`. This is the only place the
    /// process environment is consulted.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.config.openai.api_key = Some(Credential::new(key.trim()));
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.config.chunking.splitter()?;
        self.prompts.rag.template()?;
        if self.config.rag.top_k == 0 {
            return Err(DomainError::config("rag.top_k must be at least 1"));
        }
        if self.config.embedding.batch_size == 0 {
            return Err(DomainError::config("embedding.batch_size must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub rag: RagConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<Credential>,
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_seconds: Some(60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl ChunkingConfig {
    pub fn splitter(&self) -> Result<TextSplitter> {
        Ok(TextSplitter::new(self.chunk_size, self.chunk_overlap)?
            .with_separators(self.separators.iter().cloned()))
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: default_separators(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k: 6 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    #[default]
    InMemory,
    Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub metric: DistanceMetric,
    pub qdrant_url: String,
    pub collection: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::InMemory,
            metric: DistanceMetric::Cosine,
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "rag_walkthrough".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub rag: RagPromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagPromptConfig {
    pub template: String,
}

impl RagPromptConfig {
    pub fn template(&self) -> Result<PromptTemplate> {
        PromptTemplate::new(self.template.clone())
    }
}

impl Default for RagPromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_RAG_TEMPLATE.to_string(),
        }
    }
}
