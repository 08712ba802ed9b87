//! Retrieval layer: vector store, document ingestion and the store-backed
//! retriever.
//!
//! Ingestion is a one-time preprocessing phase; at chat time the store is
//! opened read-only by the retriever. The two phases are never concurrent.

pub mod chunker;
pub mod ingest;
pub mod retriever;
pub mod sqlite;
pub mod store;

pub use ingest::Ingestion;
pub use retriever::VectorRetriever;
pub use sqlite::SqliteRagStore;
pub use store::{ChunkSearchResult, RagStore, StoredChunk};
