use async_trait::async_trait;

use crate::errors::ChatError;

use super::state::{ChatState, StateUpdate};

/// Identifiers for the fixed set of workflow steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    Retrieve,
    GradeDocuments,
    Generate,
    HandleNoAnswer,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Retrieve => "retrieve",
            StepId::GradeDocuments => "grade_documents",
            StepId::Generate => "generate",
            StepId::HandleNoAnswer => "handle_no_answer",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow execution error.
///
/// Carries the failing step, the underlying cause when one exists, and the
/// sequence of steps executed before the failure, most-recent last.
#[derive(Debug)]
pub struct GraphError {
    pub step: &'static str,
    pub message: String,
    pub source: Option<ChatError>,
    pub execution_trace: Vec<StepId>,
}

impl GraphError {
    pub fn new(step: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            source: None,
            execution_trace: Vec::new(),
        }
    }

    pub fn with_source(step: &'static str, source: ChatError) -> Self {
        Self {
            step,
            message: source.to_string(),
            source: Some(source),
            execution_trace: Vec::new(),
        }
    }

    /// Record the steps run before this error (called by the driver as it
    /// unwinds after failure).
    pub fn with_trace(mut self, trace: Vec<StepId>) -> Self {
        self.execution_trace = trace;
        self
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.execution_trace.is_empty() {
            write!(f, "workflow error in {}: {}", self.step, self.message)
        } else {
            let trace: Vec<&str> = self.execution_trace.iter().map(StepId::as_str).collect();
            write!(
                f,
                "workflow error in {} (trace: {}): {}",
                self.step,
                trace.join(" -> "),
                self.message
            )
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// A workflow step: a pure async function of the current state.
///
/// Steps never mutate the state directly; they return a partial update that
/// the driver merges. Reading a field a step does not own is fine, writing
/// happens only through the returned update.
#[async_trait]
pub trait Step: Send + Sync {
    fn id(&self) -> StepId;

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError>;
}
