//! Workflow driver: an explicit transition table over `StepId` plus a
//! sequential execution loop. No step runs concurrently with another and no
//! step is skipped except through the single post-grading branch.

use std::collections::HashMap;

use super::state::ChatState;
use super::step::{GraphError, Step, StepId};

/// Outcome of the post-grading branch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Generate,
    NoDocument,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Generate => "generate",
            Decision::NoDocument => "no_document",
        }
    }
}

/// Pure decision function over the post-grading state: no surviving
/// documents means the fallback branch, anything else generates.
pub fn decide_to_generate(state: &ChatState) -> Decision {
    if state.documents.is_empty() {
        tracing::info!("decision: no relevant documents, taking fallback branch");
        Decision::NoDocument
    } else {
        tracing::info!(
            documents = state.documents.len(),
            "decision: generating answer"
        );
        Decision::Generate
    }
}

/// Transition table. `None` is the terminal state; both the generate and
/// fallback branches terminate explicitly.
fn transition(current: StepId, state: &ChatState) -> Option<StepId> {
    match current {
        StepId::Retrieve => Some(StepId::GradeDocuments),
        StepId::GradeDocuments => Some(match decide_to_generate(state) {
            Decision::Generate => StepId::Generate,
            Decision::NoDocument => StepId::HandleNoAnswer,
        }),
        StepId::Generate | StepId::HandleNoAnswer => None,
    }
}

/// A built workflow: one registered step per `StepId`.
pub struct Workflow {
    steps: HashMap<StepId, Box<dyn Step>>,
    max_steps: usize,
}

impl Workflow {
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    /// Run one invocation: seed the state with `question`, execute steps
    /// from `retrieve` until a terminal step completes, and return the final
    /// state. Any step failure aborts the invocation.
    pub async fn run(&self, question: impl Into<String>) -> Result<ChatState, GraphError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(GraphError::new("workflow", "question must not be empty"));
        }

        let mut state = ChatState::new(question);
        let mut current = Some(StepId::Retrieve);
        let mut trace: Vec<StepId> = Vec::new();

        while let Some(id) = current {
            if trace.len() >= self.max_steps {
                return Err(GraphError::new("workflow", format!(
                    "maximum steps ({}) exceeded",
                    self.max_steps
                ))
                .with_trace(trace));
            }

            let step = self.steps.get(&id).ok_or_else(|| {
                GraphError::new("workflow", format!("step not registered: {}", id))
            })?;

            tracing::debug!(step = id.as_str(), "executing workflow step");
            let update = match step.run(&state).await {
                Ok(update) => update,
                Err(err) => return Err(err.with_trace(trace)),
            };
            state.apply(update);

            trace.push(id);
            current = transition(id, &state);
        }

        Ok(state)
    }
}

/// Fluent builder for a `Workflow`. Registration order does not matter;
/// `build` verifies that all four steps are present.
pub struct WorkflowBuilder {
    steps: HashMap<StepId, Box<dyn Step>>,
    max_steps: usize,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
            // Longest path is retrieve -> grade -> generate; a little
            // headroom guards against a broken transition table.
            max_steps: 8,
        }
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn step(mut self, step: Box<dyn Step>) -> Self {
        self.steps.insert(step.id(), step);
        self
    }

    pub fn build(self) -> Result<Workflow, GraphError> {
        for id in [
            StepId::Retrieve,
            StepId::GradeDocuments,
            StepId::Generate,
            StepId::HandleNoAnswer,
        ] {
            if !self.steps.contains_key(&id) {
                return Err(GraphError::new(
                    "workflow",
                    format!("missing step: {}", id),
                ));
            }
        }
        Ok(Workflow {
            steps: self.steps,
            max_steps: self.max_steps,
        })
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::graph::state::{DocumentFragment, StateUpdate};

    struct FixedStep {
        id: StepId,
        update: fn() -> StateUpdate,
    }

    #[async_trait]
    impl Step for FixedStep {
        fn id(&self) -> StepId {
            self.id
        }

        async fn run(&self, _state: &ChatState) -> Result<StateUpdate, GraphError> {
            Ok((self.update)())
        }
    }

    struct FailingStep {
        id: StepId,
    }

    #[async_trait]
    impl Step for FailingStep {
        fn id(&self) -> StepId {
            self.id
        }

        async fn run(&self, _state: &ChatState) -> Result<StateUpdate, GraphError> {
            Err(GraphError::new(self.id.as_str(), "forced failure"))
        }
    }

    fn one_fragment() -> StateUpdate {
        StateUpdate::documents(vec![DocumentFragment::new("text", "src")])
    }

    fn builder_with(steps: Vec<Box<dyn Step>>) -> WorkflowBuilder {
        let mut builder = Workflow::builder();
        for step in steps {
            builder = builder.step(step);
        }
        builder
    }

    fn full_workflow(retrieve_update: fn() -> StateUpdate, grade_update: fn() -> StateUpdate) -> Workflow {
        builder_with(vec![
            Box::new(FixedStep {
                id: StepId::Retrieve,
                update: retrieve_update,
            }),
            Box::new(FixedStep {
                id: StepId::GradeDocuments,
                update: grade_update,
            }),
            Box::new(FixedStep {
                id: StepId::Generate,
                update: || StateUpdate::generation("generated"),
            }),
            Box::new(FixedStep {
                id: StepId::HandleNoAnswer,
                update: || StateUpdate::generation("fallback"),
            }),
        ])
        .build()
        .unwrap()
    }

    #[test]
    fn decision_is_no_document_iff_empty() {
        let mut state = ChatState::new("q");
        assert_eq!(decide_to_generate(&state), Decision::NoDocument);
        state.documents.push(DocumentFragment::new("a", "s"));
        assert_eq!(decide_to_generate(&state), Decision::Generate);
    }

    #[test]
    fn transitions_follow_the_fixed_graph() {
        let empty = ChatState::new("q");
        let mut nonempty = ChatState::new("q");
        nonempty.documents.push(DocumentFragment::new("a", "s"));

        assert_eq!(transition(StepId::Retrieve, &empty), Some(StepId::GradeDocuments));
        assert_eq!(
            transition(StepId::GradeDocuments, &nonempty),
            Some(StepId::Generate)
        );
        assert_eq!(
            transition(StepId::GradeDocuments, &empty),
            Some(StepId::HandleNoAnswer)
        );
        assert_eq!(transition(StepId::Generate, &nonempty), None);
        assert_eq!(transition(StepId::HandleNoAnswer, &empty), None);
    }

    #[tokio::test]
    async fn runs_generate_branch() {
        let workflow = full_workflow(one_fragment, one_fragment);
        let state = workflow.run("question").await.unwrap();
        assert_eq!(state.generation.as_deref(), Some("generated"));
        assert_eq!(state.documents.len(), 1);
    }

    #[tokio::test]
    async fn runs_fallback_branch_and_terminates() {
        let workflow = full_workflow(one_fragment, || StateUpdate::documents(vec![]));
        let state = workflow.run("question").await.unwrap();
        assert_eq!(state.generation.as_deref(), Some("fallback"));
        assert!(state.documents.is_empty());
    }

    #[tokio::test]
    async fn empty_question_fails_fast() {
        let workflow = full_workflow(one_fragment, one_fragment);
        assert!(workflow.run("   ").await.is_err());
    }

    #[tokio::test]
    async fn missing_step_is_a_build_error() {
        let result = builder_with(vec![Box::new(FixedStep {
            id: StepId::Retrieve,
            update: one_fragment,
        })])
        .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn step_failure_carries_trace() {
        let workflow = builder_with(vec![
            Box::new(FixedStep {
                id: StepId::Retrieve,
                update: one_fragment,
            }),
            Box::new(FailingStep {
                id: StepId::GradeDocuments,
            }),
            Box::new(FixedStep {
                id: StepId::Generate,
                update: || StateUpdate::generation("generated"),
            }),
            Box::new(FixedStep {
                id: StepId::HandleNoAnswer,
                update: || StateUpdate::generation("fallback"),
            }),
        ])
        .build()
        .unwrap();

        let err = workflow.run("question").await.unwrap_err();
        assert_eq!(err.step, "grade_documents");
        assert_eq!(err.execution_trace, vec![StepId::Retrieve]);
    }
}
