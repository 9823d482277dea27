//! Document decomposition: chunking, extraction, table detection, OCR

pub mod chunker;
pub mod extractor;
pub mod ocr;
pub mod tables;

pub use chunker::TextChunker;
pub use extractor::{ContentExtractor, ExtractionSummary};
pub use ocr::{EnrichmentSummary, OcrEnricher};
pub use tables::{DetectedTable, TableEngine, TextTableDetector};

use std::path::{Path, PathBuf};

use crate::error::Result;

/// On-disk staging layout for one message's artifacts.
///
/// Each message gets its own namespace under the staging root, so concurrent
/// consumers never race on each other's files and cleanup removes exactly one
/// message's artifacts.
#[derive(Debug, Clone)]
pub struct StagingLayout {
    root: PathBuf,
}

impl StagingLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the staging directory tree.
    pub fn create(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.paragraphs_dir(),
            self.tables_dir(),
            self.images_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of paragraph record files
    pub fn paragraphs_dir(&self) -> PathBuf {
        self.root.join("paragraphs")
    }

    /// Directory of table record files
    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("tables")
    }

    /// Directory of image files and their paired records
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }
}
