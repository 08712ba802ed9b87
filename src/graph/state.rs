use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A retrieved piece of text with opaque source metadata.
///
/// Produced by the retriever, filtered by grading, consumed by generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFragment {
    pub content: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl DocumentFragment {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// State threaded through one workflow invocation.
///
/// `question` never changes after construction. `documents` holds the
/// retrieval result, then the grading-filtered subset. `generation` is set
/// exactly once, by either the generate step or the no-answer step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatState {
    pub question: String,
    pub documents: Vec<DocumentFragment>,
    pub generation: Option<String>,
}

impl ChatState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            generation: None,
        }
    }

    /// Merge a step's partial update, overwriting only the fields it set.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(documents) = update.documents {
            self.documents = documents;
        }
        if let Some(generation) = update.generation {
            self.generation = Some(generation);
        }
    }
}

/// Partial state update returned by a step. Unset fields leave the
/// corresponding state field untouched.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub documents: Option<Vec<DocumentFragment>>,
    pub generation: Option<String>,
}

impl StateUpdate {
    pub fn documents(documents: Vec<DocumentFragment>) -> Self {
        Self {
            documents: Some(documents),
            generation: None,
        }
    }

    pub fn generation(generation: impl Into<String>) -> Self {
        Self {
            documents: None,
            generation: Some(generation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_no_documents_or_generation() {
        let state = ChatState::new("q");
        assert_eq!(state.question, "q");
        assert!(state.documents.is_empty());
        assert!(state.generation.is_none());
    }

    #[test]
    fn apply_overwrites_only_set_fields() {
        let mut state = ChatState::new("q");
        state.apply(StateUpdate::documents(vec![DocumentFragment::new("a", "s")]));
        assert_eq!(state.documents.len(), 1);
        assert!(state.generation.is_none());

        state.apply(StateUpdate::generation("answer"));
        assert_eq!(state.generation.as_deref(), Some("answer"));
        // documents untouched by a generation-only update
        assert_eq!(state.documents.len(), 1);
    }

    #[test]
    fn apply_documents_replaces_not_appends() {
        let mut state = ChatState::new("q");
        state.apply(StateUpdate::documents(vec![
            DocumentFragment::new("a", "s"),
            DocumentFragment::new("b", "s"),
        ]));
        state.apply(StateUpdate::documents(vec![DocumentFragment::new("b", "s")]));
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.documents[0].content, "b");
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut state = ChatState::new("q");
        state.apply(StateUpdate::generation("first"));
        state.apply(StateUpdate::default());
        assert_eq!(state.generation.as_deref(), Some("first"));
    }
}
