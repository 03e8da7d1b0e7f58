mod pdf;
mod text;

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ports::DocumentLoader, Document, DomainError};

pub use pdf::PdfLoader;
pub use text::TextLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Text,
    Pdf,
}

impl SourceKind {
    /// `.pdf` (any case) is a PDF; everything else is read as UTF-8 text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::Text,
        }
    }
}

pub async fn load_source(path: &Path, kind: SourceKind) -> Result<Vec<Document>, DomainError> {
    match kind {
        SourceKind::Text => TextLoader.load(path).await,
        SourceKind::Pdf => PdfLoader.load(path).await,
    }
}

pub(crate) fn io_error(path: &Path, err: io::Error) -> DomainError {
    match err.kind() {
        io::ErrorKind::NotFound => DomainError::not_found(path.display().to_string()),
        _ => DomainError::internal(format!("cannot read {}: {err}", path.display())),
    }
}
