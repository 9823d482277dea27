//! Query server binary
//!
//! Run with: cargo run -p docflow --bin docflow-server

use std::sync::Arc;

use docflow::config::PipelineConfig;
use docflow::generation::ChatClient;
use docflow::providers::PineconeIndex;
use docflow::retrieval::SearchService;
use docflow::server::{state::AppState, QueryServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docflow=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::load()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Index: {}", config.index.base_url);
    tracing::info!("  - LLM model: {}", config.llm.model);

    let index = Arc::new(PineconeIndex::new(&config.index)?);
    let llm = Arc::new(ChatClient::new(&config.llm)?);
    let search = Arc::new(SearchService::new(
        index,
        llm,
        &config.index,
        config.search.clone(),
    ));

    let server = QueryServer::new(config, AppState::new(search));
    tracing::info!("API: http://{}", server.address());
    server.start().await?;

    Ok(())
}
