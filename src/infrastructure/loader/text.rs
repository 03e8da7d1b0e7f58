use std::path::Path;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{ports::DocumentLoader, Document, DomainError, Metadata};

use super::io_error;

/// Loads a UTF-8 file as a single document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

#[async_trait]
impl DocumentLoader for TextLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn load(&self, path: &Path) -> Result<Vec<Document>, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            DomainError::format(format!("{} is not valid UTF-8: {e}", path.display()))
        })?;

        tracing::debug!(chars = text.chars().count(), "text loaded");

        Ok(vec![Document::new(
            text,
            Metadata::new(path.display().to_string()),
        )])
    }
}
