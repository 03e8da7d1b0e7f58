use tracing::instrument;

use crate::domain::{Chunk, Document, DomainError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

pub fn default_separators() -> Vec<String> {
    vec!["\n\n".to_string(), "\n".to_string(), " ".to_string()]
}

/// Every chunk after the first starts with the last `chunk_overlap` chars of
/// the one before it. Lengths are counted in `char`s.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be at least 1"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::validation(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
        })
    }

    /// Replaces the separator hierarchy. An empty list means hard cuts only.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .enumerate()
                    .map(move |(i, text)| Chunk::from_document(doc, text, i))
            })
            .collect();

        tracing::debug!(chunks = chunks.len(), "documents split");
        chunks
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        // offsets[i] is the byte offset of char i; the last entry is text.len().
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;
        if total == 0 {
            return Vec::new();
        }

        let mut unit_ends = Vec::new();
        self.collect_units(text, &offsets, 0, total, 0, &mut unit_ends);

        self.merge_units(&unit_ends)
            .into_iter()
            .map(|(start, end)| text[offsets[start]..offsets[end]].to_string())
            .collect()
    }

    /// Pushes the char end position of every unit in `[start, end)`.
    fn collect_units(
        &self,
        text: &str,
        offsets: &[usize],
        start: usize,
        end: usize,
        level: usize,
        out: &mut Vec<usize>,
    ) {
        if end - start <= self.chunk_size || level >= self.separators.len() {
            out.push(end);
            return;
        }

        let separator = self.separators[level].as_str();
        if separator.is_empty() {
            self.collect_units(text, offsets, start, end, level + 1, out);
            return;
        }

        let base = offsets[start];
        let slice = &text[base..offsets[end]];
        let mut piece_start = start;

        for (pos, _) in slice.match_indices(separator) {
            let byte_end = base + pos + separator.len();
            let piece_end = char_position(offsets, byte_end);
            if piece_end >= end {
                break;
            }
            self.collect_units(text, offsets, piece_start, piece_end, level + 1, out);
            piece_start = piece_end;
        }

        self.collect_units(text, offsets, piece_start, end, level + 1, out);
    }

    /// Packs consecutive units into `(start, end)` char spans.
    fn merge_units(&self, unit_ends: &[usize]) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        let mut end = 0;
        // Chars before `fresh` were already emitted; they are only overlap.
        let mut fresh = 0;

        for &unit_end in unit_ends {
            while end < unit_end {
                let room = self.chunk_size - (end - start);
                if unit_end - end <= room {
                    end = unit_end;
                    break;
                }

                // A chunk may close on a unit boundary only if it holds new
                // content and is long enough to supply the next overlap.
                let can_close = end > fresh && end >= self.chunk_overlap;
                if !can_close {
                    end += room;
                }

                spans.push((start, end));
                start = end - self.chunk_overlap;
                fresh = end;
            }
        }

        if end > fresh {
            spans.push((start, end));
        }

        spans
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: default_separators(),
        }
    }
}

fn char_position(offsets: &[usize], byte: usize) -> usize {
    offsets.binary_search(&byte).unwrap_or_else(|i| i)
}
