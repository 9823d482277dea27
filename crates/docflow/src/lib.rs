//! docflow: queue-driven PDF ingestion pipeline with vector-search retrieval
//!
//! The write path (`docflow-worker`) polls a message queue for document keys,
//! downloads each PDF from object storage, decomposes it into paragraph, table
//! and image records, enriches image records with OCR text, and upserts the
//! records into per-type namespaces of a vector index service. The read path
//! (`docflow-server`) answers natural-language queries by retrieving relevant
//! records and synthesizing an answer with a language model.

pub mod config;
pub mod error;
pub mod generation;
pub mod indexing;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use types::{
    record::{ChunkRecord, ChunkType},
    response::{SearchRequest, SearchResponse},
};
