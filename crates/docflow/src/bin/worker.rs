//! Ingestion worker binary
//!
//! Run with: cargo run -p docflow --bin docflow-worker

use std::sync::Arc;

use docflow::config::PipelineConfig;
use docflow::ingestion::TextTableDetector;
use docflow::processing::IngestWorker;
use docflow::providers::{LocalMessageQueue, LocalObjectStore, PineconeIndex, TesseractOcr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::load()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Staging root: {}", config.staging.root.display());
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Page ceiling: {}", config.extraction.max_pages);
    tracing::info!("  - Index: {}", config.index.base_url);

    let queue = Arc::new(LocalMessageQueue::new(&config.queue)?);
    let store = Arc::new(LocalObjectStore::new(&config.object_store)?);
    let index = Arc::new(PineconeIndex::new(&config.index)?);
    let ocr = Arc::new(TesseractOcr::new());
    let tables = Arc::new(TextTableDetector::new());

    let worker = IngestWorker::new(config, queue, store, index, ocr, tables);
    worker.run().await?;

    Ok(())
}
