use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, Result};

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

pub const DEFAULT_RAG_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end.
If you don't know the answer, just say that you don't know, don't try to make up an answer.
Use three sentences maximum and keep the answer as concise as possible.
Always say \"thanks for asking!\" at the end of the answer.

{context}

Question: {question}

Helpful Answer:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub context: String,
    pub question: String,
}

impl PromptPayload {
    pub fn new(context: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            question: question.into(),
        }
    }
}

/// A fixed instruction string with `{context}` and `{question}` slots.
///
/// Assembly is plain literal substitution in a single left-to-right pass, so
/// placeholder-like text inside the substituted values is never re-expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(DomainError::validation(format!(
                    "prompt template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    pub fn assemble(&self, payload: &PromptPayload) -> String {
        let mut out = String::with_capacity(
            self.template.len() + payload.context.len() + payload.question.len(),
        );
        let mut rest = self.template.as_str();

        loop {
            let next = [
                (rest.find(CONTEXT_PLACEHOLDER), CONTEXT_PLACEHOLDER, &payload.context),
                (rest.find(QUESTION_PLACEHOLDER), QUESTION_PLACEHOLDER, &payload.question),
            ]
            .into_iter()
            .filter_map(|(pos, placeholder, value)| pos.map(|p| (p, placeholder, value)))
            .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, placeholder, value)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(value);
                    rest = &rest[pos + placeholder.len()..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_RAG_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_substitutes_both_placeholders() {
        let template = PromptTemplate::new("Context: {context}\nQ: {question}").unwrap();
        let prompt = template.assemble(&PromptPayload::new("C", "Q"));

        assert_eq!(prompt, "Context: C\nQ: Q");
    }

    #[test]
    fn test_assemble_replaces_every_occurrence() {
        let template = PromptTemplate::new("{question} | {context} | {question}").unwrap();
        let prompt = template.assemble(&PromptPayload::new("ctx", "why?"));

        assert_eq!(prompt, "why? | ctx | why?");
    }

    #[test]
    fn test_assemble_does_not_expand_placeholders_inside_values() {
        let template = PromptTemplate::new("{context}/{question}").unwrap();
        let prompt = template.assemble(&PromptPayload::new("{question}", "{context}"));

        assert_eq!(prompt, "{question}/{context}");
    }

    #[test]
    fn test_assemble_leaves_other_text_untouched() {
        let template = PromptTemplate::default();
        let prompt = template.assemble(&PromptPayload::new("C", "Q"));

        let expected = DEFAULT_RAG_TEMPLATE
            .replace(CONTEXT_PLACEHOLDER, "C")
            .replace(QUESTION_PLACEHOLDER, "Q");
        assert_eq!(prompt, expected);
        assert!(prompt.ends_with("Question: Q\n\nHelpful Answer:"));
    }

    #[test]
    fn test_template_requires_placeholders() {
        assert!(matches!(
            PromptTemplate::new("no slots here {question}"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            PromptTemplate::new("{context} only"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_default_template_is_valid() {
        assert!(PromptTemplate::new(DEFAULT_RAG_TEMPLATE).is_ok());
    }
}
