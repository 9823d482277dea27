//! Shared state for the query server

use std::sync::Arc;

use crate::retrieval::SearchService;

/// Application state handed to route handlers
#[derive(Clone)]
pub struct AppState {
    search: Arc<SearchService>,
}

impl AppState {
    pub fn new(search: Arc<SearchService>) -> Self {
        Self { search }
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }
}
