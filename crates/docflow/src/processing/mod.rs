//! Queue-driven ingestion orchestration

pub mod worker;

pub use worker::{IngestWorker, Stage};
