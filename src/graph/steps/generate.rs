use std::sync::Arc;

use async_trait::async_trait;

use crate::chat::AnswerGenerator;
use crate::graph::state::{ChatState, DocumentFragment, StateUpdate};
use crate::graph::step::{GraphError, Step, StepId};

/// Generates the answer from the question and the surviving fragments.
pub struct GenerateStep {
    generator: Arc<dyn AnswerGenerator>,
}

impl GenerateStep {
    pub fn new(generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { generator }
    }
}

/// Join fragment texts with a blank line, preserving retrieval order.
pub fn build_context(documents: &[DocumentFragment]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Step for GenerateStep {
    fn id(&self) -> StepId {
        StepId::Generate
    }

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError> {
        // Reaching generate with no documents means the branch decision was
        // bypassed; that is a contract violation, not a soft outcome.
        if state.documents.is_empty() {
            return Err(GraphError::new(
                self.id().as_str(),
                "generate step requires at least one document",
            ));
        }

        let context = build_context(&state.documents);
        let generation = self
            .generator
            .answer(&state.question, &context)
            .await
            .map_err(|e| GraphError::with_source(self.id().as_str(), e))?;

        Ok(StateUpdate::generation(generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_joins_with_blank_line_in_order() {
        let documents = vec![
            DocumentFragment::new("X", "a"),
            DocumentFragment::new("Y", "b"),
        ];
        assert_eq!(build_context(&documents), "X\n\nY");
    }

    #[test]
    fn context_of_single_document_is_its_text() {
        let documents = vec![DocumentFragment::new("only", "a")];
        assert_eq!(build_context(&documents), "only");
    }
}
