use thiserror::Error;

/// Error taxonomy for the chatbot pipeline.
///
/// `Retrieval`, `Grading` and `Generation` mark which external collaborator
/// failed; none of them are recovered inside the workflow except per-document
/// grading, which is isolated in the grading step itself.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("vector store error: {0}")]
    Store(String),
    #[error("llm request failed: {0}")]
    Llm(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    #[error("document grading failed: {0}")]
    Grading(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        ChatError::Store(err.to_string())
    }

    pub fn llm<E: std::fmt::Display>(err: E) -> Self {
        ChatError::Llm(err.to_string())
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ChatError::Internal(err.to_string())
    }
}
