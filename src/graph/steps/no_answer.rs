use std::sync::Arc;

use async_trait::async_trait;

use crate::chat::NoAnswerHandler;
use crate::graph::state::{ChatState, StateUpdate};
use crate::graph::step::{GraphError, Step, StepId};

/// Produces the guided "no answer" response when grading left no documents.
/// Invoked with the question alone; no context is passed.
pub struct HandleNoAnswerStep {
    handler: Arc<dyn NoAnswerHandler>,
}

impl HandleNoAnswerStep {
    pub fn new(handler: Arc<dyn NoAnswerHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Step for HandleNoAnswerStep {
    fn id(&self) -> StepId {
        StepId::HandleNoAnswer
    }

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError> {
        let generation = self
            .handler
            .respond(&state.question)
            .await
            .map_err(|e| GraphError::with_source(self.id().as_str(), e))?;

        Ok(StateUpdate::generation(generation))
    }
}
