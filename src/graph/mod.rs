//! Workflow engine: a fixed state machine over a typed chat state.
//!
//! Four steps (retrieve, grade_documents, generate, handle_no_answer) with a
//! single conditional branch after grading. Each step is a pure function of
//! the current state returning a partial update; the driver owns the state
//! and merges updates between steps.

pub mod state;
pub mod step;
pub mod steps;
pub mod workflow;

pub use state::{ChatState, DocumentFragment, StateUpdate};
pub use step::{GraphError, Step, StepId};
pub use workflow::{decide_to_generate, Decision, Workflow, WorkflowBuilder};
