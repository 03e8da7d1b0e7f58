use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};

use crate::domain::ports::{Embedder, Generator, ResponseEnvelope};
use crate::domain::{Chunk, Document, DomainError, Embedding, IndexEntry, Metadata};

pub const FAKE_DIMENSION: usize = 27;

/// Letter-frequency embedder: deterministic, offline, and similar texts land
/// near each other.
#[derive(Default)]
pub struct FakeEmbedder {
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Embedding {
        let mut v = vec![0.0f32; FAKE_DIMENSION];
        for c in text.chars() {
            match c.to_ascii_lowercase() {
                l @ 'a'..='z' => v[(l as u8 - b'a') as usize] += 1.0,
                _ => v[26] += 0.1,
            }
        }
        Embedding::new(v)
    }

    fn check(&self) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::service("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.check()?;
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.check()?;
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        FAKE_DIMENSION
    }
}

/// Generator that returns a fixed reply and records every prompt it sees.
pub struct FakeGenerator {
    reply: String,
    failing: AtomicBool,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            failing: AtomicBool::new(false),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<ResponseEnvelope, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::service("upstream closed connection"));
        }
        Ok(ResponseEnvelope {
            content: self.reply.clone(),
            model: "fake-chat".to_string(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }

    fn model(&self) -> &str {
        "fake-chat"
    }
}

/// One index entry per text, all from the same fake document.
pub fn entries_for(texts: &[&str]) -> Vec<IndexEntry> {
    let doc = Document::new(texts.concat(), Metadata::new("corpus.txt"));
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            IndexEntry::new(
                FakeEmbedder::vector_for(text),
                Chunk::from_document(&doc, *text, i),
            )
        })
        .collect()
}

/// A minimal PDF with one text line per page.
pub fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => texts.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
