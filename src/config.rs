use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ChatError;

/// Top-level application configuration, loaded from a YAML file.
///
/// Every field has a serde default so a partial (or missing) config file
/// still yields a usable configuration. Environment variables override the
/// file for the values that differ per deployment.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key, if the endpoint needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Model id used for grading, generation and the fallback response.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model id used for embeddings (ingestion and query time).
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Retrieval fan-out: how many fragments to pull per question.
    #[serde(default = "default_num_documents")]
    pub num_documents: usize,
    /// Path of the SQLite vector store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Cap on chunks taken from a single source file.
    #[serde(default = "default_max_chunks_per_file")]
    pub max_chunks_per_file: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rotated log files. No file logging when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8088".to_string()
}

fn default_chat_model() -> String {
    "default".to_string()
}

fn default_embedding_model() -> String {
    "embedding".to_string()
}

fn default_num_documents() -> usize {
    5
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ragchat.db")
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_max_chunks_per_file() -> usize {
    200
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: None,
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            num_documents: default_num_documents(),
            db_path: default_db_path(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_chunks_per_file: default_max_chunks_per_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_dir: None }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| {
                ChatError::Config(format!("failed to read {}: {}", path.display(), e))
            })?;
            serde_yaml::from_str(&raw).map_err(|e| {
                ChatError::Config(format!("invalid config {}: {}", path.display(), e))
            })?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("RAGCHAT_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Ok(model) = env::var("RAGCHAT_CHAT_MODEL") {
            self.llm.chat_model = model;
        }
        if let Ok(model) = env::var("RAGCHAT_EMBEDDING_MODEL") {
            self.llm.embedding_model = model;
        }
        if let Ok(db) = env::var("RAGCHAT_DB_PATH") {
            self.retrieval.db_path = PathBuf::from(db);
        }
    }

    fn validate(&self) -> Result<(), ChatError> {
        if self.retrieval.num_documents == 0 {
            return Err(ChatError::Config(
                "retrieval.num_documents must be a positive integer".to_string(),
            ));
        }
        if self.ingestion.chunk_size == 0 {
            return Err(ChatError::Config(
                "ingestion.chunk_size must be a positive integer".to_string(),
            ));
        }
        if self.ingestion.chunk_overlap >= self.ingestion.chunk_size {
            return Err(ChatError::Config(
                "ingestion.chunk_overlap must be smaller than chunk_size".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.llm
            .api_key_env
            .as_ref()
            .and_then(|name| env::var(name).ok())
    }
}
