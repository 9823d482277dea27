//! OCR enrichment of staged image records

use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::providers::ocr::OcrEngine;
use crate::types::record::ChunkRecord;

/// Counts for one enrichment run
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichmentSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fills staged image records' text from image content.
///
/// Images pair with records by base name (`x.png` / `x.json`). An image with
/// no paired record is skipped with a warning; a failure on one image is
/// logged and does not halt the rest.
pub struct OcrEnricher<'a> {
    image_dir: PathBuf,
    engine: &'a dyn OcrEngine,
}

impl<'a> OcrEnricher<'a> {
    pub fn new(image_dir: impl Into<PathBuf>, engine: &'a dyn OcrEngine) -> Self {
        Self {
            image_dir: image_dir.into(),
            engine,
        }
    }

    /// Enrich every image in the directory.
    pub async fn run(&self) -> Result<EnrichmentSummary> {
        let mut summary = EnrichmentSummary::default();

        let mut images: Vec<PathBuf> = std::fs::read_dir(&self.image_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        for image in images {
            let record_path = image.with_extension("json");
            if !record_path.is_file() {
                tracing::warn!(image = %image.display(), "No record paired with image, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.process_image(&image, &record_path).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    tracing::error!(image = %image.display(), "Failed to process image: {}", e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "OCR enrichment done"
        );
        Ok(summary)
    }

    async fn process_image(&self, image: &Path, record_path: &Path) -> Result<()> {
        let mut record: ChunkRecord =
            serde_json::from_str(&std::fs::read_to_string(record_path)?)?;

        let bytes = std::fs::read(image)?;
        let text = self.engine.recognize(&bytes).await?;

        let image_index = record.image_index.unwrap_or(record.chunk_index);
        record.chunk_text = format!(
            "{}\n\nThis image belongs to page {} and image num {}.",
            text, record.page_number, image_index
        );
        record.ocr_processed_at = Some(Utc::now());

        let file = std::fs::File::create(record_path)?;
        serde_json::to_writer_pretty(file, &record)
            .map_err(|e| Error::internal(format!("failed to rewrite record: {}", e)))?;
        Ok(())
    }
}
