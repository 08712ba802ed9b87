use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DocumentGrader, RelevanceJudgment};
use crate::errors::ChatError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

const GRADER_SYSTEM_PROMPT: &str = "You are a grader assessing the relevance of a retrieved \
document to a user question. If the document contains keywords or meaning related to the \
question, grade it as relevant. Answer with a JSON object of the form \
{\"binary_score\": \"yes\"} or {\"binary_score\": \"no\"} and nothing else.";

/// LLM-backed relevance grader. Asks for a strict yes/no verdict and parses
/// the reply leniently, since small models drift from the requested format.
pub struct LlmDocumentGrader {
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmDocumentGrader {
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

#[derive(Deserialize)]
struct GradeReply {
    binary_score: String,
}

/// Accepts either the requested JSON shape or a bare yes/no token.
fn parse_verdict(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();

    if let Ok(reply) = serde_json::from_str::<GradeReply>(trimmed) {
        return Some(reply.binary_score.trim().eq_ignore_ascii_case("yes"));
    }

    // Some models wrap the JSON in code fences or prose; look for the field.
    if let Some(idx) = trimmed.find("binary_score") {
        let tail = &trimmed[idx..];
        if let Some(yes_idx) = tail.to_ascii_lowercase().find("yes") {
            let no_idx = tail.to_ascii_lowercase().find("no\"");
            return Some(no_idx.map_or(true, |n| yes_idx < n));
        }
        if tail.to_ascii_lowercase().contains("no") {
            return Some(false);
        }
        return None;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "yes" | "\"yes\"" => Some(true),
        "no" | "\"no\"" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl DocumentGrader for LlmDocumentGrader {
    async fn grade(
        &self,
        question: &str,
        fragment: &str,
    ) -> Result<RelevanceJudgment, ChatError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(GRADER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Retrieved document:\n{}\n\nUser question: {}",
                fragment, question
            )),
        ])
        .with_temperature(0.0);

        let raw = self
            .llm
            .chat(request, &self.model)
            .await
            .map_err(|e| ChatError::Grading(e.to_string()))?;

        let relevant = parse_verdict(&raw).ok_or_else(|| {
            ChatError::Grading(format!("unparseable grader verdict: {:?}", raw))
        })?;

        Ok(RelevanceJudgment { relevant })
    }
}
