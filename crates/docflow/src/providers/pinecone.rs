//! HTTP client for a Pinecone-style vector index with integrated embedding
//!
//! The service embeds records and queries server-side from their text, so the
//! pipeline never computes vectors itself. Namespaces partition the index by
//! chunk type.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::IndexConfig;
use crate::error::{Error, Result};

use super::vector_index::{IndexHit, UpsertRecord, VectorIndex};

/// REST client for the vector index service
pub struct PineconeIndex {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    records: &'a [UpsertRecord],
}

#[derive(Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<IndexHit>,
}

impl PineconeIndex {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Index(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn namespace_url(&self, namespace: &str, operation: &str) -> String {
        format!(
            "{}/records/namespaces/{}/{}",
            self.base_url, namespace, operation
        )
    }

    async fn ensure_success(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Index(format!(
            "{} failed: HTTP {} - {}",
            context, status, body
        )))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, namespace: &str, records: &[UpsertRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.namespace_url(namespace, "upsert"))
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { records })
            .send()
            .await
            .map_err(|e| Error::Index(format!("upsert request failed: {}", e)))?;

        Self::ensure_success(response, "upsert").await?;
        tracing::debug!(namespace, count = records.len(), "Upserted records");
        Ok(())
    }

    async fn search(&self, namespace: &str, query: &str, top_k: usize) -> Result<Vec<IndexHit>> {
        let body = json!({
            "query": {
                "top_k": top_k,
                "inputs": { "text": query },
            }
        });

        let response = self
            .client
            .post(self.namespace_url(namespace, "search"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Index(format!("search request failed: {}", e)))?;

        let response = Self::ensure_success(response, "search").await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("failed to parse search response: {}", e)))?;
        Ok(parsed.result.hits)
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn index(base_url: String) -> PineconeIndex {
        PineconeIndex::new(&IndexConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            ..IndexConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn upsert_posts_records_to_the_namespace() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/records/namespaces/pdf-paragraphs/upsert")
                    .header("Api-Key", "test-key")
                    .json_body_partial(
                        r#"{"records": [{"id": "doc#page1#para1", "chunk_text": "hello"}]}"#,
                    );
                then.status(200).json_body(serde_json::json!({}));
            })
            .await;

        let record = UpsertRecord::from_value(serde_json::json!({
            "id": "doc#page1#para1",
            "chunk_text": "hello",
            "page_number": 1,
        }))
        .unwrap();

        index(server.base_url())
            .upsert("pdf-paragraphs", &[record])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_batch_skips_the_request() {
        // No server at this address; an accidental request would error.
        let index = index("http://127.0.0.1:9".to_string());
        index.upsert("pdf-paragraphs", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn search_returns_ranked_hits() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/records/namespaces/pdf-tables/search")
                    .json_body_partial(
                        r#"{"query": {"top_k": 3, "inputs": {"text": "total revenue"}}}"#,
                    );
                then.status(200).json_body(serde_json::json!({
                    "result": {
                        "hits": [
                            {
                                "_id": "doc#page1#table1#chunk1",
                                "_score": 0.92,
                                "fields": { "chunk_text": "Revenue,14.2" }
                            }
                        ]
                    }
                }));
            })
            .await;

        let hits = index(server.base_url())
            .search("pdf-tables", "total revenue", 3)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "doc#page1#table1#chunk1");
        assert_eq!(hits[0].chunk_text(), Some("Revenue,14.2"));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_index_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains("/search");
                then.status(500).body("backend exploded");
            })
            .await;

        let err = index(server.base_url())
            .search("pdf-paragraphs", "anything", 5)
            .await
            .unwrap_err();
        match err {
            Error::Index(message) => assert!(message.contains("500")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
