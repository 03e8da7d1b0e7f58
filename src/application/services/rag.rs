use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use crate::application::format::{format_context, parse_response};
use crate::application::services::Retriever;
use crate::domain::{ports::Generator, Chunk, DomainError, PromptPayload, PromptTemplate};

#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<Chunk>,
}

/// Query phase: retrieve → format context → assemble prompt → generate → parse.
///
/// Holds no mutable state; a failed question leaves the index untouched.
pub struct RagService {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    template: PromptTemplate,
}

impl RagService {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            retriever,
            generator,
            template,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Builds the exact prompt that would be sent for `question`.
    #[instrument(skip(self, question))]
    pub async fn prompt_for(&self, question: &str) -> Result<(String, Vec<Chunk>), DomainError> {
        let sources = self.retriever.retrieve(question).await?;
        let payload = PromptPayload::new(format_context(&sources), question);
        Ok((self.template.assemble(&payload), sources))
    }

    #[instrument(skip(self, question), fields(model = self.generator.model()))]
    pub async fn answer(&self, question: &str) -> Result<RagAnswer, DomainError> {
        let (prompt, sources) = self.prompt_for(question).await?;
        let envelope = self.generator.generate(&prompt).await?;

        if let Some(usage) = &envelope.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        Ok(RagAnswer {
            answer: parse_response(&envelope),
            sources,
        })
    }

    pub async fn ask(&self, question: &str) -> Result<String, DomainError> {
        Ok(self.answer(question).await?.answer)
    }
}
