//! Retrieval and answer synthesis over the indexed namespaces

use std::sync::Arc;

use crate::config::{IndexConfig, SearchConfig};
use crate::error::{Error, Result};
use crate::generation::prompt::{PromptBuilder, NOT_AVAILABLE};
use crate::providers::llm::LanguageModel;
use crate::providers::vector_index::VectorIndex;

/// Outcome of one answered query
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The model's answer, verbatim
    pub result: String,
    pub paragraphs_retrieved: usize,
    pub tables_retrieved: usize,
}

/// Answers queries from the paragraph and table namespaces.
///
/// Retrieval flow: similarity-search both namespaces, place the retrieved
/// texts into the fixed prompt template, and return the model's answer
/// verbatim. Retrieval and model failures surface to the caller.
pub struct SearchService {
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LanguageModel>,
    paragraph_namespace: String,
    table_namespace: String,
    limits: SearchConfig,
}

impl SearchService {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LanguageModel>,
        index_config: &IndexConfig,
        limits: SearchConfig,
    ) -> Self {
        Self {
            index,
            llm,
            paragraph_namespace: index_config.paragraph_namespace.clone(),
            table_namespace: index_config.table_namespace.clone(),
            limits,
        }
    }

    /// Answer a query. Empty queries are rejected before any retrieval call;
    /// result bounds fall back to the configured defaults and are clamped to
    /// the configured maximum.
    pub async fn answer(
        &self,
        query: &str,
        top_k_paragraphs: Option<usize>,
        top_k_tables: Option<usize>,
    ) -> Result<SearchOutcome> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let k_paragraphs = self.clamp(top_k_paragraphs, self.limits.default_top_k_paragraphs);
        let k_tables = self.clamp(top_k_tables, self.limits.default_top_k_tables);

        let paragraphs = self.retrieve(&self.paragraph_namespace, query, k_paragraphs).await?;
        let tables = self.retrieve(&self.table_namespace, query, k_tables).await?;

        tracing::info!(
            paragraphs = paragraphs.len(),
            tables = tables.len(),
            "Retrieved context for query"
        );

        if paragraphs.is_empty() && tables.is_empty() {
            // Nothing to ground an answer in; skip the model call.
            return Ok(SearchOutcome {
                result: NOT_AVAILABLE.to_string(),
                paragraphs_retrieved: 0,
                tables_retrieved: 0,
            });
        }

        let prompt = PromptBuilder::build_search_prompt(query, &paragraphs, &tables);
        let result = self.llm.complete(&prompt).await?;

        Ok(SearchOutcome {
            result,
            paragraphs_retrieved: paragraphs.len(),
            tables_retrieved: tables.len(),
        })
    }

    async fn retrieve(&self, namespace: &str, query: &str, top_k: usize) -> Result<Vec<String>> {
        let hits = self.index.search(namespace, query, top_k).await?;
        Ok(hits
            .iter()
            .filter_map(|hit| hit.chunk_text().map(str::to_string))
            .collect())
    }

    fn clamp(&self, requested: Option<usize>, default: usize) -> usize {
        requested
            .unwrap_or(default)
            .clamp(1, self.limits.max_top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::vector_index::{IndexHit, UpsertRecord};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::Mutex;

    struct CannedIndex {
        paragraph_hits: Vec<&'static str>,
        table_hits: Vec<&'static str>,
        searches: Mutex<Vec<(String, usize)>>,
    }

    impl CannedIndex {
        fn new(paragraph_hits: Vec<&'static str>, table_hits: Vec<&'static str>) -> Self {
            Self {
                paragraph_hits,
                table_hits,
                searches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for CannedIndex {
        async fn upsert(&self, _ns: &str, _records: &[UpsertRecord]) -> Result<()> {
            Ok(())
        }

        async fn search(&self, namespace: &str, _query: &str, top_k: usize) -> Result<Vec<IndexHit>> {
            self.searches
                .lock()
                .unwrap()
                .push((namespace.to_string(), top_k));
            let texts = if namespace.contains("paragraph") {
                &self.paragraph_hits
            } else {
                &self.table_hits
            };
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let mut fields = Map::new();
                    fields.insert("chunk_text".into(), serde_json::json!(text));
                    IndexHit {
                        id: format!("hit-{}", i),
                        score: 0.9,
                        fields,
                    }
                })
                .collect())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct EchoLlm;

    #[async_trait]
    impl LanguageModel for EchoLlm {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("answered from {} bytes of prompt", prompt.len()))
        }
        fn name(&self) -> &str {
            "echo"
        }
        fn model(&self) -> &str {
            "echo-1"
        }
    }

    struct PanickingLlm;

    #[async_trait]
    impl LanguageModel for PanickingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            panic!("the model must not be called without retrieved context");
        }
        fn name(&self) -> &str {
            "panicking"
        }
        fn model(&self) -> &str {
            "none"
        }
    }

    fn service(index: CannedIndex, llm: Arc<dyn LanguageModel>) -> SearchService {
        SearchService::new(
            Arc::new(index),
            llm,
            &IndexConfig::default(),
            SearchConfig::default(),
        )
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_retrieval() {
        let index = CannedIndex::new(vec!["text"], vec![]);
        let service = service(index, Arc::new(EchoLlm));
        assert!(matches!(
            service.answer("   ", None, None).await.unwrap_err(),
            Error::EmptyQuery
        ));
    }

    #[tokio::test]
    async fn no_matching_content_returns_the_literal_marker() {
        let index = CannedIndex::new(vec![], vec![]);
        let service = service(index, Arc::new(PanickingLlm));
        let outcome = service
            .answer("What is the total revenue?", None, None)
            .await
            .unwrap();
        assert_eq!(outcome.result, NOT_AVAILABLE);
        assert_eq!(outcome.paragraphs_retrieved, 0);
        assert_eq!(outcome.tables_retrieved, 0);
    }

    #[tokio::test]
    async fn both_namespaces_are_searched_with_clamped_bounds() {
        let index = CannedIndex::new(vec!["para"], vec!["table"]);
        let service = SearchService::new(
            Arc::new(index),
            Arc::new(EchoLlm),
            &IndexConfig::default(),
            SearchConfig::default(),
        );

        let outcome = service
            .answer("what changed?", Some(500), Some(0))
            .await
            .unwrap();
        assert_eq!(outcome.paragraphs_retrieved, 1);
        assert_eq!(outcome.tables_retrieved, 1);
        assert!(outcome.result.starts_with("answered from"));
    }

    #[tokio::test]
    async fn bounds_are_clamped_to_the_configured_maximum() {
        let index = CannedIndex::new(vec!["para"], vec!["table"]);
        let index_ref = Arc::new(index);
        let service = SearchService::new(
            index_ref.clone(),
            Arc::new(EchoLlm),
            &IndexConfig::default(),
            SearchConfig::default(),
        );

        service
            .answer("what changed?", Some(500), Some(0))
            .await
            .unwrap();

        let searches = index_ref.searches.lock().unwrap();
        assert_eq!(searches[0], ("pdf-paragraphs".to_string(), 20));
        assert_eq!(searches[1], ("pdf-tables".to_string(), 1));
    }

    #[tokio::test]
    async fn default_bounds_apply_when_unspecified() {
        let index_ref = Arc::new(CannedIndex::new(vec!["para"], vec!["table"]));
        let service = SearchService::new(
            index_ref.clone(),
            Arc::new(EchoLlm),
            &IndexConfig::default(),
            SearchConfig::default(),
        );

        service.answer("what changed?", None, None).await.unwrap();

        let searches = index_ref.searches.lock().unwrap();
        assert_eq!(searches[0].1, 5);
        assert_eq!(searches[1].1, 10);
    }

    #[tokio::test]
    async fn retrieval_failure_surfaces_to_the_caller() {
        struct FailingIndex;

        #[async_trait]
        impl VectorIndex for FailingIndex {
            async fn upsert(&self, _ns: &str, _r: &[UpsertRecord]) -> Result<()> {
                Ok(())
            }
            async fn search(&self, _ns: &str, _q: &str, _k: usize) -> Result<Vec<IndexHit>> {
                Err(Error::index("index unreachable"))
            }
            fn name(&self) -> &str {
                "failing"
            }
        }

        let service = SearchService::new(
            Arc::new(FailingIndex),
            Arc::new(EchoLlm),
            &IndexConfig::default(),
            SearchConfig::default(),
        );
        assert!(matches!(
            service.answer("query", None, None).await.unwrap_err(),
            Error::Index(_)
        ));
    }
}
