//! Long-running queue consumer driving the per-document pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::indexing::upsert::IndexUpsertGateway;
use crate::ingestion::{ContentExtractor, OcrEnricher, StagingLayout, TableEngine, TextChunker};
use crate::providers::object_store::ObjectStore;
use crate::providers::ocr::OcrEngine;
use crate::providers::queue::{MessageQueue, QueueMessage};
use crate::providers::vector_index::VectorIndex;

/// Pipeline stage reached for one message, for logging and diagnostics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Downloaded,
    Extracted,
    OcrDone,
    Indexed,
    Moved,
    Acked,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Downloaded => "downloaded",
            Self::Extracted => "extracted",
            Self::OcrDone => "ocr_done",
            Self::Indexed => "indexed",
            Self::Moved => "moved",
            Self::Acked => "acked",
        };
        f.write_str(name)
    }
}

/// Queue consumer that runs the full ingestion pipeline per message.
///
/// Messages are processed in isolation: each gets its own staging namespace
/// keyed by document id and a run id, torn down when the message finishes,
/// so independent consumers never race on shared files. A failed message is
/// left un-acknowledged and comes back through the queue's visibility
/// timeout; deterministic record ids make the reprocessing an overwrite.
pub struct IngestWorker {
    config: PipelineConfig,
    queue: Arc<dyn MessageQueue>,
    store: Arc<dyn ObjectStore>,
    index: Arc<dyn VectorIndex>,
    ocr: Arc<dyn OcrEngine>,
    tables: Arc<dyn TableEngine>,
}

impl IngestWorker {
    pub fn new(
        config: PipelineConfig,
        queue: Arc<dyn MessageQueue>,
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn VectorIndex>,
        ocr: Arc<dyn OcrEngine>,
        tables: Arc<dyn TableEngine>,
    ) -> Self {
        Self {
            config,
            queue,
            store,
            index,
            ocr,
            tables,
        }
    }

    /// Run a pool of independent consumers until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let consumers = self.config.worker.consumer_count();
        tracing::info!(
            consumers,
            queue = self.queue.name(),
            index = self.index.name(),
            "Ingestion worker started"
        );

        let worker = Arc::new(self);
        let mut tasks = JoinSet::new();
        for consumer_id in 0..consumers {
            let worker = Arc::clone(&worker);
            tasks.spawn(async move { worker.consume_loop(consumer_id).await });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Consumer task ended: {}", e);
            }
        }
        Ok(())
    }

    /// One consumer: poll forever, sleeping the poll interval when the queue
    /// is empty or unreachable.
    async fn consume_loop(&self, consumer_id: usize) {
        let poll_interval = Duration::from_secs(self.config.worker.poll_interval_secs);
        loop {
            match self.poll_once().await {
                Ok(0) => {
                    tracing::debug!(consumer_id, "No messages in queue, waiting");
                    tokio::time::sleep(poll_interval).await;
                }
                Ok(count) => {
                    tracing::debug!(consumer_id, count, "Batch processed");
                }
                Err(e) => {
                    tracing::error!(consumer_id, "Queue receive failed: {}", e);
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    /// Receive one batch and process its messages sequentially. Returns the
    /// number of messages received; a message that fails stays un-acked and
    /// does not stop the rest of the batch.
    pub async fn poll_once(&self) -> Result<usize> {
        let messages = self.queue.receive_messages().await?;
        if messages.is_empty() {
            return Ok(0);
        }

        let received = messages.len();
        for message in messages {
            if let Err(e) = self.process_message(&message).await {
                tracing::error!(body = %message.body, "Failed to process message: {}", e);
            }
        }
        Ok(received)
    }

    /// Run the pipeline for one message inside its own staging namespace,
    /// then tear that namespace down whatever the outcome.
    pub async fn process_message(&self, message: &QueueMessage) -> Result<()> {
        let key = message.body.trim().to_string();
        tracing::info!(stage = %Stage::Received, key, "Processing message");

        let file_name = Path::new(&key)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.clone());
        let document_id = Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let run_id = Uuid::new_v4();
        let staging = self
            .config
            .staging
            .root
            .join(format!("{}-{}", document_id, run_id));

        let result = self
            .run_pipeline(&key, &file_name, &staging, &message.receipt_handle)
            .await;

        // Best-effort cleanup, success or failure, to bound disk growth.
        if staging.exists() {
            match std::fs::remove_dir_all(&staging) {
                Ok(()) => tracing::info!(staging = %staging.display(), "Deleted staging folder"),
                Err(e) => {
                    tracing::warn!(staging = %staging.display(), "Failed to delete staging: {}", e)
                }
            }
        }

        result
    }

    async fn run_pipeline(
        &self,
        key: &str,
        file_name: &str,
        staging: &Path,
        receipt_handle: &str,
    ) -> Result<()> {
        let layout = StagingLayout::new(staging);
        layout.create()?;
        let local_pdf = staging.join(file_name);

        if let Err(e) = self.store.download(key, &local_pdf).await {
            // A redelivery can race a completed run whose ack was lost; the
            // object then lives under the processed folder already.
            let processed = &self.config.object_store.processed_folder;
            if self.store.exists(processed, key).await.unwrap_or(false) {
                tracing::info!(key, "Object already processed, acknowledging redelivery");
                self.queue.delete_message(receipt_handle).await?;
                return Ok(());
            }
            return Err(e);
        }
        tracing::info!(stage = %Stage::Downloaded, key, path = %local_pdf.display(), "Downloaded file");

        let chunker = TextChunker::new(
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        );
        let extractor = ContentExtractor::new(
            &local_pdf,
            layout.clone(),
            chunker,
            self.config.extraction.max_pages,
        );
        let extraction = extractor.extract_all(self.tables.as_ref());
        tracing::info!(
            stage = %Stage::Extracted,
            document = extractor.document_id(),
            paragraphs = extraction.paragraphs,
            tables = extraction.tables,
            images = extraction.images,
            "PDF extraction done"
        );

        let enrichment = OcrEnricher::new(layout.images_dir(), self.ocr.as_ref())
            .run()
            .await?;
        tracing::info!(
            stage = %Stage::OcrDone,
            document = extractor.document_id(),
            processed = enrichment.processed,
            "OCR completed for images"
        );

        let gateway = IndexUpsertGateway::new(self.index.as_ref());
        let namespaces = &self.config.index;
        gateway
            .upsert_directory(&layout.paragraphs_dir(), &namespaces.paragraph_namespace)
            .await;
        gateway
            .upsert_directory(&layout.tables_dir(), &namespaces.table_namespace)
            .await;
        gateway
            .upsert_directory(&layout.images_dir(), &namespaces.image_namespace)
            .await;
        tracing::info!(stage = %Stage::Indexed, document = extractor.document_id(), "Index upsert done");

        self.store
            .move_object(
                key,
                &self.config.object_store.input_folder,
                &self.config.object_store.processed_folder,
            )
            .await?;
        tracing::info!(stage = %Stage::Moved, key, "Moved file to processed folder");

        self.queue.delete_message(receipt_handle).await?;
        tracing::info!(stage = %Stage::Acked, key, "Message acknowledged");
        Ok(())
    }
}
