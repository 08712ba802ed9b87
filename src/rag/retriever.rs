//! Store-backed retriever: embeds the query and runs a similarity search.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::store::RagStore;
use crate::chat::Retriever;
use crate::errors::ChatError;
use crate::graph::state::DocumentFragment;
use crate::llm::LlmProvider;

pub struct VectorRetriever {
    store: Arc<dyn RagStore>,
    llm: Arc<dyn LlmProvider>,
    embedding_model: String,
}

impl VectorRetriever {
    pub fn new(
        store: Arc<dyn RagStore>,
        llm: Arc<dyn LlmProvider>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            llm,
            embedding_model: embedding_model.into(),
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentFragment>, ChatError> {
        let embeddings = self
            .llm
            .embed(&[query.to_string()], &self.embedding_model)
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;

        let query_embedding = embeddings
            .first()
            .ok_or_else(|| ChatError::Retrieval("empty query embedding".to_string()))?;

        let hits = self
            .store
            .search(query_embedding, k)
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;

        Ok(hits
            .into_iter()
            .map(|hit| {
                DocumentFragment::new(hit.chunk.content, hit.chunk.source).with_metadata(json!({
                    "chunk_id": hit.chunk.chunk_id,
                    "score": hit.score,
                }))
            })
            .collect())
    }
}
