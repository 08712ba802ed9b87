//! Folder ingestion: read text documents, chunk, embed, store.
//!
//! One-time preprocessing; never invoked during a chat workflow.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::chunker::{split_into_chunks, TextChunk};
use super::store::{RagStore, StoredChunk};
use crate::config::IngestionConfig;
use crate::errors::ChatError;
use crate::llm::LlmProvider;

const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Batch size for embedding calls during ingestion.
const EMBED_BATCH: usize = 16;

pub struct Ingestion {
    store: Arc<dyn RagStore>,
    llm: Arc<dyn LlmProvider>,
    embedding_model: String,
    config: IngestionConfig,
}

impl Ingestion {
    pub fn new(
        store: Arc<dyn RagStore>,
        llm: Arc<dyn LlmProvider>,
        embedding_model: impl Into<String>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            store,
            llm,
            embedding_model: embedding_model.into(),
            config,
        }
    }

    /// Ingest every supported file under `input_dir` (recursively) into the
    /// vector store. Returns the number of chunks stored.
    pub async fn ingest_folder(&self, input_dir: &Path) -> Result<usize, ChatError> {
        if !input_dir.is_dir() {
            return Err(ChatError::Config(format!(
                "ingestion input is not a directory: {}",
                input_dir.display()
            )));
        }

        let mut files = Vec::new();
        collect_files(input_dir, &mut files)?;
        files.sort();

        let mut total = 0;
        for file in &files {
            let chunks = self.chunk_file(file)?;
            if chunks.is_empty() {
                tracing::warn!(file = %file.display(), "no chunks produced, skipping");
                continue;
            }
            let stored = self.embed_and_store(chunks).await?;
            tracing::info!(file = %file.display(), chunks = stored, "ingested");
            total += stored;
        }

        tracing::info!(files = files.len(), chunks = total, "ingestion complete");
        Ok(total)
    }

    fn chunk_file(&self, path: &Path) -> Result<Vec<TextChunk>, ChatError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(split_into_chunks(&text, &source, &self.config))
    }

    async fn embed_and_store(&self, chunks: Vec<TextChunk>) -> Result<usize, ChatError> {
        let mut stored = 0;

        for batch in chunks.chunks(EMBED_BATCH) {
            let inputs: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.llm.embed(&inputs, &self.embedding_model).await?;

            let items: Vec<(StoredChunk, Vec<f32>)> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| {
                    let stored_chunk = StoredChunk {
                        chunk_id: Uuid::new_v4().to_string(),
                        content: chunk.text.clone(),
                        source: chunk.source.clone(),
                        metadata: Some(json!({
                            "start_offset": chunk.start_offset,
                            "chunk_index": chunk.chunk_index,
                        })),
                    };
                    (stored_chunk, embedding)
                })
                .collect();

            stored += items.len();
            self.store.insert_batch(items).await?;
        }

        Ok(stored)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<(), ChatError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ChatError::Config(format!("failed to list {}: {}", dir.display(), e)))?;

    for entry in entries {
        let entry = entry.map_err(ChatError::internal)?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
        {
            out.push(path);
        }
    }

    Ok(())
}
