//! Query API routes

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::types::response::{SearchRequest, SearchResponse};

use super::state::AppState;

/// Build the API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/search", post(search))
}

/// POST /search - answer a query from the indexed namespaces
async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    tracing::info!(query = %request.query, "Search requested");

    let outcome = state
        .search()
        .answer(
            &request.query,
            request.top_k_paragraphs,
            request.top_k_tables,
        )
        .await?;

    tracing::info!("Search executed successfully");
    Ok(Json(SearchResponse {
        result: outcome.result,
        paragraphs_retrieved: outcome.paragraphs_retrieved,
        tables_retrieved: outcome.tables_retrieved,
    }))
}
