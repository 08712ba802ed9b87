//! RAG chatbot over a local vector store.
//!
//! Documents are ingested into a SQLite-backed vector store, then questions
//! are answered by a fixed workflow: retrieve similar fragments, grade each
//! fragment's relevance with the LLM, and either generate an answer from the
//! relevant fragments or fall back to a guided "no answer" response.

pub mod chat;
pub mod config;
pub mod errors;
pub mod graph;
pub mod llm;
pub mod logging;
pub mod rag;
