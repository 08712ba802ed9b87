//! End-to-end workflow tests with mocked collaborators: both branches of the
//! post-grading decision, order preservation, context construction, failure
//! propagation and idempotence.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use ragchat::chat::{
    AnswerGenerator, DocumentGrader, NoAnswerHandler, RelevanceJudgment, Retriever,
};
use ragchat::errors::ChatError;
use ragchat::graph::steps::{GenerateStep, GradeDocumentsStep, HandleNoAnswerStep, RetrieveStep};
use ragchat::graph::{DocumentFragment, Workflow};

struct FixedRetriever {
    fragments: Vec<DocumentFragment>,
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(
        &self,
        _query: &str,
        k: usize,
    ) -> Result<Vec<DocumentFragment>, ChatError> {
        Ok(self.fragments.iter().take(k).cloned().collect())
    }
}

struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn retrieve(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<DocumentFragment>, ChatError> {
        Err(ChatError::Retrieval("vector store offline".to_string()))
    }
}

/// Grades a fragment relevant iff its content is in the allow set; errors on
/// contents in the fail set.
struct SetGrader {
    relevant: HashSet<String>,
    failing: HashSet<String>,
}

impl SetGrader {
    fn relevant_for<const N: usize>(contents: [&str; N]) -> Self {
        Self {
            relevant: contents.iter().map(|s| s.to_string()).collect(),
            failing: HashSet::new(),
        }
    }

    fn failing_on<const N: usize, const M: usize>(
        relevant: [&str; N],
        failing: [&str; M],
    ) -> Self {
        Self {
            relevant: relevant.iter().map(|s| s.to_string()).collect(),
            failing: failing.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DocumentGrader for SetGrader {
    async fn grade(
        &self,
        _question: &str,
        fragment: &str,
    ) -> Result<RelevanceJudgment, ChatError> {
        if self.failing.contains(fragment) {
            return Err(ChatError::Grading("grader timeout".to_string()));
        }
        Ok(RelevanceJudgment {
            relevant: self.relevant.contains(fragment),
        })
    }
}

/// Echoes its inputs so tests can assert the exact context it received.
struct EchoGenerator;

#[async_trait]
impl AnswerGenerator for EchoGenerator {
    async fn answer(&self, question: &str, context: &str) -> Result<String, ChatError> {
        Ok(format!("answer[{}|{}]", question, context))
    }
}

struct EchoFallback;

#[async_trait]
impl NoAnswerHandler for EchoFallback {
    async fn respond(&self, question: &str) -> Result<String, ChatError> {
        Ok(format!("fallback[{}]", question))
    }
}

fn fragment(content: &str) -> DocumentFragment {
    DocumentFragment::new(content, format!("{}.txt", content))
}

fn workflow(
    retriever: Arc<dyn Retriever>,
    grader: Arc<dyn DocumentGrader>,
    k: usize,
) -> Workflow {
    Workflow::builder()
        .step(Box::new(RetrieveStep::new(retriever, k)))
        .step(Box::new(GradeDocumentsStep::new(grader)))
        .step(Box::new(GenerateStep::new(Arc::new(EchoGenerator))))
        .step(Box::new(HandleNoAnswerStep::new(Arc::new(EchoFallback))))
        .build()
        .unwrap()
}

#[tokio::test]
async fn all_relevant_documents_reach_generate() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("X"), fragment("Y")],
    });
    let grader = Arc::new(SetGrader::relevant_for(["X", "Y"]));

    let state = workflow(retriever, grader, 5).run("Q1").await.unwrap();

    assert_eq!(state.documents.len(), 2);
    // Context is the fragment texts joined with a blank line, in order.
    assert_eq!(state.generation.as_deref(), Some("answer[Q1|X\n\nY]"));
}

#[tokio::test]
async fn all_irrelevant_documents_reach_fallback() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("X"), fragment("Y"), fragment("Z")],
    });
    let grader = Arc::new(SetGrader::relevant_for([]));

    let state = workflow(retriever, grader, 5).run("Q1").await.unwrap();

    assert!(state.documents.is_empty());
    assert_eq!(state.generation.as_deref(), Some("fallback[Q1]"));
}

#[tokio::test]
async fn zero_retrieved_fragments_reach_fallback() {
    let retriever = Arc::new(FixedRetriever { fragments: vec![] });
    let grader = Arc::new(SetGrader::relevant_for(["anything"]));

    let state = workflow(retriever, grader, 5).run("Q2").await.unwrap();

    assert!(state.documents.is_empty());
    assert_eq!(state.generation.as_deref(), Some("fallback[Q2]"));
}

#[tokio::test]
async fn grading_filter_preserves_retrieval_order() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("A"), fragment("B"), fragment("C")],
    });
    let grader = Arc::new(SetGrader::relevant_for(["B"]));

    let state = workflow(retriever, grader, 5).run("Q").await.unwrap();

    assert_eq!(state.documents.len(), 1);
    assert_eq!(state.documents[0].content, "B");
}

#[tokio::test]
async fn partial_relevance_keeps_order_of_survivors() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("A"), fragment("B"), fragment("C")],
    });
    let grader = Arc::new(SetGrader::relevant_for(["C", "A"]));

    let state = workflow(retriever, grader, 5).run("Q").await.unwrap();

    let contents: Vec<&str> = state.documents.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, vec!["A", "C"]);
    assert_eq!(state.generation.as_deref(), Some("answer[Q|A\n\nC]"));
}

#[tokio::test]
async fn retrieval_respects_fan_out() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("A"), fragment("B"), fragment("C")],
    });
    let grader = Arc::new(SetGrader::relevant_for(["A", "B", "C"]));

    let state = workflow(retriever, grader, 2).run("Q").await.unwrap();

    assert_eq!(state.documents.len(), 2);
}

#[tokio::test]
async fn retriever_failure_aborts_the_invocation() {
    let grader = Arc::new(SetGrader::relevant_for(["A"]));
    let err = workflow(Arc::new(FailingRetriever), grader, 5)
        .run("Q")
        .await
        .unwrap_err();

    assert_eq!(err.step, "retrieve");
    assert!(matches!(err.source, Some(ChatError::Retrieval(_))));
}

#[tokio::test]
async fn grader_failure_skips_only_that_document() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("A"), fragment("B"), fragment("C")],
    });
    let grader = Arc::new(SetGrader::failing_on(["A", "C"], ["B"]));

    let state = workflow(retriever, grader, 5).run("Q").await.unwrap();

    let contents: Vec<&str> = state.documents.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, vec!["A", "C"]);
}

#[tokio::test]
async fn deterministic_mocks_make_the_workflow_idempotent() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("X"), fragment("Y")],
    });
    let grader = Arc::new(SetGrader::relevant_for(["X"]));
    let workflow = workflow(retriever, grader, 5);

    let first = workflow.run("Q").await.unwrap();
    let second = workflow.run("Q").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn generation_is_set_by_exactly_one_branch() {
    let retriever = Arc::new(FixedRetriever {
        fragments: vec![fragment("X")],
    });
    let grader = Arc::new(SetGrader::relevant_for(["X"]));

    let state = workflow(retriever, grader, 5).run("Q").await.unwrap();

    // Generate branch ran; the fallback text never appears.
    let generation = state.generation.unwrap();
    assert!(generation.starts_with("answer["));
    assert!(!generation.contains("fallback"));
}
