use std::path::Path;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{ports::DocumentLoader, Document, DomainError, Metadata};

use super::io_error;

/// Loads a PDF as one document per page, in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

/// Parses PDF bytes and extracts the text of every page.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DomainError> {
    let pdf = lopdf::Document::load_mem(bytes)
        .map_err(|e| DomainError::format(format!("cannot parse PDF: {e}")))?;

    // Page numbers are 1-based and come back sorted.
    pdf.get_pages()
        .keys()
        .map(|&number| {
            pdf.extract_text(&[number]).map_err(|e| {
                DomainError::format(format!("cannot extract text from page {number}: {e}"))
            })
        })
        .collect()
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn load(&self, path: &Path) -> Result<Vec<Document>, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;

        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| DomainError::internal(format!("PDF parser task failed: {e}")))??;

        tracing::debug!(pages = pages.len(), "pdf loaded");

        let source = path.display().to_string();
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(page, text)| Document::new(text, Metadata::new(source.clone()).with_page(page)))
            .collect())
    }
}
