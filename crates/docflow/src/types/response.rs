//! Query request and response types

use serde::{Deserialize, Serialize};

/// Search request for the query service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The natural-language query
    pub query: String,
    /// Paragraph result count; clamped to the configured maximum
    #[serde(default)]
    pub top_k_paragraphs: Option<usize>,
    /// Table result count; clamped to the configured maximum
    #[serde(default)]
    pub top_k_tables: Option<usize>,
}

/// Search response with the synthesized answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The model's answer, verbatim
    pub result: String,
    /// Number of paragraph records retrieved
    pub paragraphs_retrieved: usize,
    /// Number of table records retrieved
    pub tables_retrieved: usize,
}
