//! Provider abstractions for the pipeline's external collaborators
//!
//! Trait-based seams for the message queue, object storage, the vector index
//! service, the OCR engine and the language model, with filesystem-backed
//! local implementations and HTTP clients for the remote services.

pub mod llm;
pub mod local;
pub mod object_store;
pub mod ocr;
pub mod pinecone;
pub mod queue;
pub mod vector_index;

pub use llm::LanguageModel;
pub use local::{LocalMessageQueue, LocalObjectStore};
pub use object_store::ObjectStore;
pub use ocr::{OcrEngine, TesseractOcr};
pub use pinecone::PineconeIndex;
pub use queue::{MessageQueue, QueueMessage};
pub use vector_index::{IndexHit, UpsertRecord, VectorIndex};
