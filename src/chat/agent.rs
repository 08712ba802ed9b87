use std::sync::Arc;

use super::{LlmAnswerGenerator, LlmDocumentGrader, LlmNoAnswerHandler, Retriever};
use crate::config::AppConfig;
use crate::graph::step::GraphError;
use crate::graph::steps::{GenerateStep, GradeDocumentsStep, HandleNoAnswerStep, RetrieveStep};
use crate::graph::{ChatState, Workflow};
use crate::llm::LlmProvider;
use crate::rag::VectorRetriever;
use crate::rag::store::RagStore;

/// The assembled chatbot: a built workflow plus the single invocation
/// surface `ask`.
pub struct ChatAgent {
    workflow: Workflow,
}

impl ChatAgent {
    /// Wire the store-backed retriever and the LLM-backed grader, generator
    /// and fallback handler into the fixed workflow.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn RagStore>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self, GraphError> {
        let retriever: Arc<dyn Retriever> = Arc::new(VectorRetriever::new(
            store,
            llm.clone(),
            config.llm.embedding_model.clone(),
        ));
        let grader = Arc::new(LlmDocumentGrader::new(
            llm.clone(),
            config.llm.chat_model.clone(),
        ));
        let generator = Arc::new(LlmAnswerGenerator::new(
            llm.clone(),
            config.llm.chat_model.clone(),
        ));
        let handler = Arc::new(LlmNoAnswerHandler::new(llm, config.llm.chat_model.clone()));

        let workflow = Workflow::builder()
            .step(Box::new(RetrieveStep::new(
                retriever,
                config.retrieval.num_documents,
            )))
            .step(Box::new(GradeDocumentsStep::new(grader)))
            .step(Box::new(GenerateStep::new(generator)))
            .step(Box::new(HandleNoAnswerStep::new(handler)))
            .build()?;

        Ok(Self { workflow })
    }

    /// Answer one question, returning the final workflow state. The
    /// `generation` field is always set on success, by exactly one of the
    /// two terminal steps.
    pub async fn ask(&self, question: &str) -> Result<ChatState, GraphError> {
        self.workflow.run(question).await
    }
}
