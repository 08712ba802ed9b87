//! RagStore trait — abstract interface for vector-store backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ChatError;

/// A stored chunk with its source and opaque metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source identifier (filename, usually).
    pub source: String,
    /// Optional metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Abstract vector-store backend. The primary implementation is
/// `SqliteRagStore`.
#[async_trait]
pub trait RagStore: Send + Sync {
    /// Insert a chunk with its embedding vector.
    async fn insert(&self, chunk: StoredChunk, embedding: Vec<f32>) -> Result<(), ChatError>;

    /// Insert multiple chunks in one transaction.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ChatError>;

    /// Return the `limit` chunks most similar to the query embedding,
    /// ordered by descending similarity.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ChatError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, ChatError>;

    /// Remove all chunks, e.g. before re-ingesting a corpus.
    async fn clear(&self) -> Result<(), ChatError>;
}
