//! Upserts staged chunk records into a vector index namespace

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::providers::vector_index::{UpsertRecord, VectorIndex};

/// Writes a directory of staged record files into one index namespace.
///
/// Each `*.json` file holds either a single record or a list; eligible
/// records of one file form one upsert batch. A failure is logged and not
/// retried here: the orchestrator's queue redelivery is the retry mechanism.
pub struct IndexUpsertGateway<'a> {
    index: &'a dyn VectorIndex,
}

impl<'a> IndexUpsertGateway<'a> {
    pub fn new(index: &'a dyn VectorIndex) -> Self {
        Self { index }
    }

    /// Upsert all eligible records under `dir` into `namespace`, returning
    /// the number of records submitted. Failures are logged, not raised.
    pub async fn upsert_directory(&self, dir: &Path, namespace: &str) -> usize {
        match self.try_upsert_directory(dir, namespace).await {
            Ok(count) => {
                tracing::info!(namespace, count, "Namespace updated");
                count
            }
            Err(e) => {
                tracing::error!(
                    namespace,
                    dir = %dir.display(),
                    "Failed to upsert staged records: {}",
                    e
                );
                0
            }
        }
    }

    async fn try_upsert_directory(&self, dir: &Path, namespace: &str) -> Result<usize> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        tracing::info!(
            namespace,
            files = files.len(),
            dir = %dir.display(),
            "Pushing staged records"
        );

        let mut total = 0;
        for file in files {
            let value: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let batch = eligible_records(value);
            if batch.is_empty() {
                continue;
            }
            self.index.upsert(namespace, &batch).await?;
            total += batch.len();
        }
        Ok(total)
    }
}

/// Apply the text-presence policy and build upsert entries.
///
/// A record with empty text is dropped unless it is an image record: images
/// may legitimately be indexed before OCR fills their text.
pub(crate) fn eligible_records(value: Value) -> Vec<UpsertRecord> {
    let entries = match value {
        Value::Array(items) => items,
        single => vec![single],
    };

    entries
        .into_iter()
        .filter(|entry| {
            let text = entry.get("chunk_text").and_then(Value::as_str).unwrap_or("");
            let chunk_type = entry.get("chunk_type").and_then(Value::as_str).unwrap_or("");
            !text.is_empty() || chunk_type == "image"
        })
        .filter_map(UpsertRecord::from_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingIndex {
        upserts: Mutex<Vec<(String, Vec<UpsertRecord>)>>,
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn upsert(&self, namespace: &str, records: &[UpsertRecord]) -> Result<()> {
            self.upserts
                .lock()
                .unwrap()
                .push((namespace.to_string(), records.to_vec()));
            Ok(())
        }

        async fn search(
            &self,
            _namespace: &str,
            _query: &str,
            _top_k: usize,
        ) -> Result<Vec<crate::providers::vector_index::IndexHit>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn empty_text_paragraph_is_never_submitted() {
        let records = eligible_records(json!([
            { "id": "a", "chunk_text": "", "chunk_type": "paragraph" },
            { "id": "b", "chunk_text": "content", "chunk_type": "paragraph" },
        ]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "b");
    }

    #[test]
    fn empty_text_image_passes_the_policy() {
        let records = eligible_records(json!(
            { "id": "img", "chunk_text": "", "chunk_type": "image" }
        ));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "img");
        assert_eq!(records[0].chunk_text, "");
    }

    #[tokio::test]
    async fn directory_batches_per_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("doc_page1_paragraphs.json"),
            json!([
                { "id": "doc#page1#para1", "chunk_text": "one", "chunk_type": "paragraph" },
                { "id": "doc#page1#para2", "chunk_text": "two", "chunk_type": "paragraph" },
            ])
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("doc_page2_paragraphs.json"),
            json!([
                { "id": "doc#page2#para1", "chunk_text": "three", "chunk_type": "paragraph" },
            ])
            .to_string(),
        )
        .unwrap();

        let index = RecordingIndex::default();
        let count = IndexUpsertGateway::new(&index)
            .upsert_directory(dir.path(), "pdf-paragraphs")
            .await;

        assert_eq!(count, 3);
        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 2);
        assert!(upserts.iter().all(|(ns, _)| ns == "pdf-paragraphs"));
        assert_eq!(upserts[0].1.len(), 2);
        assert_eq!(upserts[1].1.len(), 1);
    }

    #[tokio::test]
    async fn single_record_files_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("doc_page2_img1.json"),
            json!({ "id": "doc#page2#img1", "chunk_text": "", "chunk_type": "image" }).to_string(),
        )
        .unwrap();

        let index = RecordingIndex::default();
        let count = IndexUpsertGateway::new(&index)
            .upsert_directory(dir.path(), "pdf-images")
            .await;
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn upsert_failure_is_contained() {
        struct FailingIndex;

        #[async_trait]
        impl VectorIndex for FailingIndex {
            async fn upsert(&self, _ns: &str, _records: &[UpsertRecord]) -> Result<()> {
                Err(crate::error::Error::index("index unreachable"))
            }
            async fn search(
                &self,
                _ns: &str,
                _q: &str,
                _k: usize,
            ) -> Result<Vec<crate::providers::vector_index::IndexHit>> {
                Ok(Vec::new())
            }
            fn name(&self) -> &str {
                "failing"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("doc_page1_paragraphs.json"),
            json!([{ "id": "a", "chunk_text": "x", "chunk_type": "paragraph" }]).to_string(),
        )
        .unwrap();

        let count = IndexUpsertGateway::new(&FailingIndex)
            .upsert_directory(dir.path(), "pdf-paragraphs")
            .await;
        assert_eq!(count, 0);
    }
}
