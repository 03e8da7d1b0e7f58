use std::path::Path;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Document};

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<Document>, DomainError>;
}
