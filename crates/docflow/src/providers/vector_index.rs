//! Vector index service boundary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// One record submitted for upsert. The index service embeds server-side
/// from `chunk_text`; every other field rides along as metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRecord {
    pub id: String,
    pub chunk_text: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl UpsertRecord {
    /// Build an upsert entry from a serialized chunk record: `id` and
    /// `chunk_text` are lifted out, the remaining fields become metadata.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let id = fields.remove("id")?.as_str()?.to_string();
        let chunk_text = fields
            .remove("chunk_text")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        Some(Self {
            id,
            chunk_text,
            metadata: fields,
        })
    }
}

/// One ranked hit from a similarity search
#[derive(Debug, Clone, Deserialize)]
pub struct IndexHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: f32,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl IndexHit {
    /// The hit's indexed text, when present
    pub fn chunk_text(&self) -> Option<&str> {
        self.fields.get("chunk_text").and_then(Value::as_str)
    }
}

/// Vector index service interface: per-namespace text upsert and similarity
/// search. Upserting an existing id overwrites it, which is what makes
/// at-least-once queue delivery safe for this pipeline.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert a batch of records into a namespace.
    async fn upsert(&self, namespace: &str, records: &[UpsertRecord]) -> Result<()>;

    /// Similarity search over a namespace, embedding the query server-side.
    async fn search(&self, namespace: &str, query: &str, top_k: usize) -> Result<Vec<IndexHit>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
