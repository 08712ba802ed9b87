//! Collaborator seams consumed by the workflow steps, their LLM-backed
//! implementations, and the agent that wires everything together.

mod agent;
mod fallback;
mod generator;
mod grader;

pub use agent::ChatAgent;
pub use fallback::LlmNoAnswerHandler;
pub use generator::LlmAnswerGenerator;
pub use grader::LlmDocumentGrader;

use async_trait::async_trait;

use crate::errors::ChatError;
use crate::graph::state::DocumentFragment;

/// Binary relevance verdict for one fragment. Transient: used only while
/// building the filtered document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceJudgment {
    pub relevant: bool,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return the `k` fragments most similar to `query`, best first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentFragment>, ChatError>;
}

#[async_trait]
pub trait DocumentGrader: Send + Sync {
    /// Judge whether one fragment is relevant to the question.
    async fn grade(&self, question: &str, fragment: &str)
        -> Result<RelevanceJudgment, ChatError>;
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer from the question and the concatenated context.
    async fn answer(&self, question: &str, context: &str) -> Result<String, ChatError>;
}

#[async_trait]
pub trait NoAnswerHandler: Send + Sync {
    /// Produce the guided response for a question with no supporting
    /// evidence. Receives no context by design.
    async fn respond(&self, question: &str) -> Result<String, ChatError>;
}
