//! Turning retrieval results into prompt context, and completions into text.

use crate::domain::{ports::ResponseEnvelope, Chunk};

pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Joins chunk texts with a blank line, in retrieval order.
pub fn format_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub fn parse_response(envelope: &ResponseEnvelope) -> String {
    envelope.content.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, Metadata};

    #[test]
    fn test_format_context_joins_with_blank_line() {
        let doc = Document::new("", Metadata::new("a.txt"));
        let chunks = vec![
            Chunk::from_document(&doc, "first", 0),
            Chunk::from_document(&doc, "second", 1),
            Chunk::from_document(&doc, "third", 2),
        ];

        assert_eq!(format_context(&chunks), "first\n\nsecond\n\nthird");
        assert_eq!(format_context(&chunks[..1]), "first");
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_parse_response_returns_content_verbatim() {
        let envelope = ResponseEnvelope {
            content: "  I don't know. Thanks for asking!\n".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        };

        assert_eq!(parse_response(&envelope), "  I don't know. Thanks for asking!\n");
    }
}
