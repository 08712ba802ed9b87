use std::sync::Arc;

use async_trait::async_trait;

use crate::chat::Retriever;
use crate::graph::state::{ChatState, StateUpdate};
use crate::graph::step::{GraphError, Step, StepId};

/// Pulls the top-k fragments for the question from the retriever.
/// A retriever failure aborts the whole invocation.
pub struct RetrieveStep {
    retriever: Arc<dyn Retriever>,
    num_documents: usize,
}

impl RetrieveStep {
    pub fn new(retriever: Arc<dyn Retriever>, num_documents: usize) -> Self {
        Self {
            retriever,
            num_documents,
        }
    }
}

#[async_trait]
impl Step for RetrieveStep {
    fn id(&self) -> StepId {
        StepId::Retrieve
    }

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError> {
        let documents = self
            .retriever
            .retrieve(&state.question, self.num_documents)
            .await
            .map_err(|e| GraphError::with_source(self.id().as_str(), e))?;

        tracing::info!(retrieved = documents.len(), "retrieval complete");
        Ok(StateUpdate::documents(documents))
    }
}
