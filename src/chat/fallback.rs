use std::sync::Arc;

use async_trait::async_trait;

use super::NoAnswerHandler;
use crate::errors::ChatError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

const NO_ANSWER_SYSTEM_PROMPT: &str = "The knowledge base contains no document relevant to \
the user's question. Tell the user politely that no answer could be found, then help them \
ask a better question: suggest narrowing an overly broad question, adding a time range or \
context for figures, and offer two or three rephrased example questions close to theirs. \
Remind them the system can only answer from its ingested documents.";

/// Produces the guided fallback response. Deliberately receives the question
/// only; there is no evidence to cite.
pub struct LlmNoAnswerHandler {
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmNoAnswerHandler {
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

#[async_trait]
impl NoAnswerHandler for LlmNoAnswerHandler {
    async fn respond(&self, question: &str) -> Result<String, ChatError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(NO_ANSWER_SYSTEM_PROMPT),
            ChatMessage::user(question.to_string()),
        ]);

        self.llm
            .chat(request, &self.model)
            .await
            .map_err(|e| ChatError::Generation(e.to_string()))
    }
}
