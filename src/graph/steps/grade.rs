use std::sync::Arc;

use async_trait::async_trait;

use crate::chat::DocumentGrader;
use crate::graph::state::{ChatState, StateUpdate};
use crate::graph::step::{GraphError, Step, StepId};

/// Grades each retrieved fragment against the question and keeps only the
/// relevant ones, preserving retrieval order.
///
/// Grading calls run one at a time, in order. A failed grading call is
/// isolated: the fragment is logged and treated as not relevant instead of
/// aborting the step, so one flaky call cannot sink the invocation.
pub struct GradeDocumentsStep {
    grader: Arc<dyn DocumentGrader>,
}

impl GradeDocumentsStep {
    pub fn new(grader: Arc<dyn DocumentGrader>) -> Self {
        Self { grader }
    }
}

#[async_trait]
impl Step for GradeDocumentsStep {
    fn id(&self) -> StepId {
        StepId::GradeDocuments
    }

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError> {
        let mut filtered = Vec::with_capacity(state.documents.len());

        for document in &state.documents {
            match self.grader.grade(&state.question, &document.content).await {
                Ok(judgment) if judgment.relevant => {
                    tracing::info!(source = %document.source, "grade: document relevant");
                    filtered.push(document.clone());
                }
                Ok(_) => {
                    tracing::info!(source = %document.source, "grade: document not relevant");
                }
                Err(err) => {
                    tracing::warn!(
                        source = %document.source,
                        error = %err,
                        "grading call failed, treating document as not relevant"
                    );
                }
            }
        }

        Ok(StateUpdate::documents(filtered))
    }
}
