//! Error types for the ingestion and retrieval pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Object storage error
    #[error("Object storage error: {0}")]
    ObjectStore(String),

    /// Content extraction error
    #[error("Failed to extract from '{document}': {message}")]
    Extract { document: String, message: String },

    /// OCR engine error
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Vector index service error
    #[error("Vector index error: {0}")]
    Index(String),

    /// Language model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Empty query rejected before dispatch
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extract(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extract {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create a queue error
    pub fn queue(message: impl Into<String>) -> Self {
        Self::Queue(message.into())
    }

    /// Create an object storage error
    pub fn object_store(message: impl Into<String>) -> Self {
        Self::ObjectStore(message.into())
    }

    /// Create a vector index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::EmptyQuery => (
                StatusCode::BAD_REQUEST,
                "empty_query",
                self.to_string(),
            ),
            Error::Extract { document, message } => (
                StatusCode::BAD_REQUEST,
                "extract_error",
                format!("Failed to extract from '{}': {}", document, message),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Index(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "index_error", msg.clone())
            }
            Error::Queue(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "queue_error", msg.clone())
            }
            Error::ObjectStore(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "object_store_error",
                msg.clone(),
            ),
            Error::Ocr(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "ocr_error", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
