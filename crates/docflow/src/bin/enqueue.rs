//! Producer helper: upload a PDF to the input folder and enqueue its key
//!
//! Run with: cargo run -p docflow --bin docflow-enqueue -- <pdf-path>

use anyhow::Context;
use std::path::PathBuf;

use docflow::config::PipelineConfig;
use docflow::providers::{LocalMessageQueue, LocalObjectStore, ObjectStore};
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

    let path: PathBuf = std::env::args()
        .nth(1)
        .context("usage: docflow-enqueue <pdf-path>")?
        .into();
    let key = path
        .file_name()
        .context("path has no file name")?
        .to_string_lossy()
        .into_owned();

    let config = PipelineConfig::load()?;
    let store = LocalObjectStore::new(&config.object_store)?;
    let queue = LocalMessageQueue::new(&config.queue)?;

    store
        .upload(&path, &key, &config.object_store.input_folder)
        .await?;
    let message_id = queue.send_message(&key)?;
    tracing::info!(key, message_id, "Document uploaded and enqueued");

    Ok(())
}
