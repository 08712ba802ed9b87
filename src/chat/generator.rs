use std::sync::Arc;

use async_trait::async_trait;

use super::AnswerGenerator;
use crate::errors::ChatError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

const ANSWER_SYSTEM_PROMPT: &str = "You are an assistant answering questions from retrieved \
documents. Use only the provided context. Identify the main topic of the question, ground \
every claim in the context, rephrase rather than quote verbatim, give concrete examples \
where the context offers them, and end with a one-sentence conclusion. If the context gives \
figures, cite them. Avoid vague or generic statements.";

/// LLM-backed answer generator: question plus concatenated context in, prose
/// answer out.
pub struct LlmAnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmAnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn answer(&self, question: &str, context: &str) -> Result<String, ChatError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(ANSWER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Context:\n{}\n\nQuestion: {}",
                context, question
            )),
        ]);

        self.llm
            .chat(request, &self.model)
            .await
            .map_err(|e| ChatError::Generation(e.to_string()))
    }
}
