//! PDF content extraction into staged chunk records

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object};

use crate::error::{Error, Result};
use crate::types::record::ChunkRecord;

use super::chunker::TextChunker;
use super::tables::TableEngine;
use super::StagingLayout;

/// Counts of records produced by one extraction run
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionSummary {
    pub paragraphs: usize,
    pub tables: usize,
    pub images: usize,
}

/// Extracts paragraph, table and image records from a PDF into the staging
/// layout. The three sub-extractions are independent passes over the same
/// source; a failure in one is logged at its boundary and never aborts the
/// other two.
pub struct ContentExtractor {
    pdf_path: PathBuf,
    document_id: String,
    layout: StagingLayout,
    chunker: TextChunker,
    max_pages: usize,
}

impl ContentExtractor {
    pub fn new(
        pdf_path: impl Into<PathBuf>,
        layout: StagingLayout,
        chunker: TextChunker,
        max_pages: usize,
    ) -> Self {
        let pdf_path = pdf_path.into();
        let document_id = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self {
            pdf_path,
            document_id,
            layout,
            chunker,
            max_pages,
        }
    }

    /// Stem of the source file name, used as the document id
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Run all three sub-extractions, isolating failures per pass.
    pub fn extract_all(&self, tables: &dyn TableEngine) -> ExtractionSummary {
        let mut summary = ExtractionSummary::default();

        match self.extract_paragraphs() {
            Ok(count) => summary.paragraphs = count,
            Err(e) => tracing::error!(document = %self.document_id, "Failed to extract paragraphs: {}", e),
        }

        match self.extract_tables(tables) {
            Ok(count) => summary.tables = count,
            Err(e) => tracing::warn!(document = %self.document_id, "No tables extracted: {}", e),
        }

        match self.extract_images() {
            Ok(count) => summary.images = count,
            Err(e) => tracing::error!(document = %self.document_id, "Failed to extract images: {}", e),
        }

        summary
    }

    /// Extract page text, chunk it, and stage one record file per page.
    /// Pages with no text yield no records and no file.
    pub fn extract_paragraphs(&self) -> Result<usize> {
        let data = std::fs::read(&self.pdf_path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&data)
            .map_err(|e| Error::extract(&self.document_id, format!("text layer: {}", e)))?;

        let source = self.pdf_path.display().to_string();
        let mut total = 0;

        for (i, page_text) in pages.iter().enumerate().take(self.max_pages) {
            let page_number = i as u32 + 1;
            if page_text.trim().is_empty() {
                continue;
            }

            let records: Vec<ChunkRecord> = self
                .chunker
                .split(page_text)
                .into_iter()
                .enumerate()
                .map(|(j, chunk)| {
                    ChunkRecord::paragraph(
                        &self.document_id,
                        &source,
                        page_number,
                        j as u32 + 1,
                        chunk,
                    )
                })
                .collect();

            if records.is_empty() {
                continue;
            }

            let file = self
                .layout
                .paragraphs_dir()
                .join(format!("{}_page{}_paragraphs.json", self.document_id, page_number));
            write_json(&file, &serde_json::to_value(&records)?)?;
            total += records.len();
        }

        tracing::info!(document = %self.document_id, records = total, "Paragraph extraction done");
        Ok(total)
    }

    /// Run table detection, chunk each table's CSV form, and stage one record
    /// file per table. Zero detections is a normal outcome.
    pub fn extract_tables(&self, engine: &dyn TableEngine) -> Result<usize> {
        let detected = engine.detect(&self.pdf_path, self.max_pages)?;
        let source = self.pdf_path.display().to_string();
        let mut total = 0;
        // Tables are numbered within their page.
        let mut per_page = std::collections::HashMap::new();

        for table in detected {
            let table_index = per_page
                .entry(table.page_number)
                .and_modify(|n| *n += 1)
                .or_insert(1u32);
            let table_index = *table_index;

            let delimited = table.to_delimited()?;
            let records: Vec<ChunkRecord> = self
                .chunker
                .split(&delimited)
                .into_iter()
                .enumerate()
                .map(|(j, chunk)| {
                    ChunkRecord::table(
                        &self.document_id,
                        &source,
                        table.page_number,
                        table_index,
                        j as u32 + 1,
                        chunk,
                    )
                })
                .collect();

            if records.is_empty() {
                continue;
            }

            let file = self.layout.tables_dir().join(format!(
                "{}_page{}_table{}.json",
                self.document_id, table.page_number, table_index
            ));
            write_json(&file, &serde_json::to_value(&records)?)?;
            total += records.len();
        }

        tracing::info!(document = %self.document_id, records = total, "Table extraction done");
        Ok(total)
    }

    /// Persist each embedded image's raw bytes and stage one record per image
    /// with empty text; the OCR enricher fills the text later.
    pub fn extract_images(&self) -> Result<usize> {
        let doc = Document::load(&self.pdf_path)
            .map_err(|e| Error::extract(&self.document_id, format!("load: {}", e)))?;

        let source = self.pdf_path.display().to_string();
        let mut total = 0;

        for (page_number, page_id) in doc.get_pages().into_iter().take(self.max_pages) {
            let mut image_index = 0u32;
            for bytes in page_image_streams(&doc, page_id) {
                image_index += 1;

                let image_file = self.layout.images_dir().join(format!(
                    "{}_page{}_img{}.png",
                    self.document_id, page_number, image_index
                ));
                std::fs::write(&image_file, &bytes)?;

                let record = ChunkRecord::image(
                    &self.document_id,
                    &source,
                    page_number,
                    image_index,
                    image_file.display().to_string(),
                );
                let json_file = image_file.with_extension("json");
                write_json(&json_file, &serde_json::to_value(&record)?)?;
                total += 1;
            }
        }

        tracing::info!(document = %self.document_id, records = total, "Image extraction done");
        Ok(total)
    }
}

/// Collect the raw content bytes of every image XObject on a page.
fn page_image_streams(doc: &Document, page_id: lopdf::ObjectId) -> Vec<Vec<u8>> {
    let mut images = Vec::new();

    let (resources, resource_ids) = doc.get_page_resources(page_id);
    let mut dicts: Vec<&Dictionary> = Vec::new();
    if let Some(dict) = resources {
        dicts.push(dict);
    }
    for id in resource_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object(id) {
            dicts.push(dict);
        }
    }

    for resources in dicts {
        let Ok(xobjects) = resources.get(b"XObject") else {
            continue;
        };
        let xobjects = match xobjects {
            Object::Dictionary(dict) => dict,
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Dictionary(dict)) => dict,
                _ => continue,
            },
            _ => continue,
        };

        for (_name, entry) in xobjects.iter() {
            let stream = match entry {
                Object::Stream(stream) => stream,
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(Object::Stream(stream)) => stream,
                    _ => continue,
                },
                _ => continue,
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|name| name == b"Image".as_slice())
                .unwrap_or(false);
            if is_image {
                images.push(stream.content.clone());
            }
        }
    }

    images
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
