//! Configuration for the ingestion pipeline and query service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Message queue configuration
    pub queue: QueueConfig,
    /// Object storage configuration
    pub object_store: ObjectStoreConfig,
    /// Local staging configuration
    pub staging: StagingConfig,
    /// Text chunking configuration
    pub chunking: ChunkingConfig,
    /// PDF extraction configuration
    pub extraction: ExtractionConfig,
    /// Vector index configuration
    pub index: IndexConfig,
    /// Language model configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub search: SearchConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Worker loop configuration
    pub worker: WorkerConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any section the file omits.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("invalid config: {}", e)))
    }

    /// Load from the path named by `DOCFLOW_CONFIG`, or `docflow.toml` if it
    /// exists, or built-in defaults otherwise.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("DOCFLOW_CONFIG") {
            return Self::from_file(Path::new(&path));
        }
        let default_path = Path::new("docflow.toml");
        if default_path.exists() {
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }
}

/// Message queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Directory backing the local queue
    pub queue_dir: PathBuf,
    /// Maximum messages per receive call
    pub max_messages: usize,
    /// Bounded wait for a receive call, in seconds
    pub wait_time_secs: u64,
    /// Visibility timeout before an un-acked message is redelivered
    pub visibility_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_dir: PathBuf::from("queue"),
            max_messages: 5,
            wait_time_secs: 2,
            visibility_timeout_secs: 120,
        }
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// Directory backing the local bucket
    pub bucket_dir: PathBuf,
    /// Logical folder holding documents awaiting ingestion
    pub input_folder: String,
    /// Logical folder documents are relocated to after ingestion
    pub processed_folder: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            bucket_dir: PathBuf::from("bucket"),
            input_folder: "input".to_string(),
            processed_folder: "processed".to_string(),
        }
    }
}

/// Local staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Root under which each message gets its own staging namespace
    pub root: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("staging"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in bytes
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in bytes
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// PDF extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Page-count ceiling; pages beyond it are not extracted
    pub max_pages: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { max_pages: 30 }
    }
}

/// Vector index service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Base URL of the index service
    pub base_url: String,
    /// API key; falls back to the `PINECONE_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Namespace holding paragraph records
    pub paragraph_namespace: String,
    /// Namespace holding table records
    pub table_namespace: String,
    /// Namespace holding image records
    pub image_namespace: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5080".to_string(),
            api_key: None,
            timeout_secs: 30,
            paragraph_namespace: "pdf-paragraphs".to_string(),
            table_namespace: "pdf-tables".to_string(),
            image_namespace: "pdf-images".to_string(),
        }
    }
}

impl IndexConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var("PINECONE_API_KEY")
            .map_err(|_| Error::Config("PINECONE_API_KEY environment variable not set".into()))
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat-completions endpoint
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API key; falls back to the `GROQ_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Sampling temperature; zero for deterministic decoding
    pub temperature: f32,
    /// Completion token budget
    pub max_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            temperature: 0.0,
            max_tokens: 1024,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var("GROQ_API_KEY")
            .map_err(|_| Error::Config("GROQ_API_KEY environment variable not set".into()))
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default paragraph result count
    pub default_top_k_paragraphs: usize,
    /// Default table result count
    pub default_top_k_tables: usize,
    /// Upper bound applied to both result counts
    pub max_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k_paragraphs: 5,
            default_top_k_tables: 10,
            max_top_k: 20,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Worker loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Seconds to sleep when a poll returns no messages
    pub poll_interval_secs: u64,
    /// Number of independent consumers; defaults to a CPU-derived count
    pub workers: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            workers: None,
        }
    }
}

impl WorkerConfig {
    /// Resolved consumer count.
    pub fn consumer_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().min(4))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.extraction.max_pages, 30);
        assert_eq!(config.index.paragraph_namespace, "pdf-paragraphs");
        assert_eq!(config.search.max_top_k, 20);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: PipelineConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 800

            [worker]
            poll_interval_secs = 3
            workers = 2
            "#,
        )
        .unwrap();
        assert_eq!(parsed.chunking.chunk_size, 800);
        assert_eq!(parsed.chunking.chunk_overlap, 50);
        assert_eq!(parsed.worker.poll_interval_secs, 3);
        assert_eq!(parsed.worker.consumer_count(), 2);
        assert_eq!(parsed.queue.max_messages, 5);
    }
}
