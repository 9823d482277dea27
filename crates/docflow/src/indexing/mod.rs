//! Staged-record indexing

pub mod upsert;

pub use upsert::IndexUpsertGateway;
