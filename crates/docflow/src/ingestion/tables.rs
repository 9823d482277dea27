//! Table detection over PDF page text

use std::path::Path;

use crate::error::{Error, Result};

/// A table found on one page, as rows of cells
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// 1-based page the table was found on
    pub page_number: u32,
    pub rows: Vec<Vec<String>>,
}

impl DetectedTable {
    /// Serialize the table to CSV for chunking and indexing.
    pub fn to_delimited(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| Error::internal(format!("CSV serialization failed: {}", e)))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::internal(format!("CSV serialization failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::internal(format!("CSV not UTF-8: {}", e)))
    }
}

/// Table extraction engine boundary: a PDF and a page ceiling in, a sequence
/// of tabular results out.
pub trait TableEngine: Send + Sync {
    fn detect(&self, pdf_path: &Path, max_pages: usize) -> Result<Vec<DetectedTable>>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Text-layout table detector.
///
/// Scans extracted page text for runs of consecutive lines that break into
/// multiple columns (cells separated by tabs or two-plus spaces). A run of at
/// least `min_rows` such lines is treated as one table.
pub struct TextTableDetector {
    min_rows: usize,
    min_columns: usize,
}

impl TextTableDetector {
    pub fn new() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
        }
    }

    /// Detect tables in one page's text.
    pub fn detect_in_text(&self, page_number: u32, text: &str) -> Vec<DetectedTable> {
        let mut tables = Vec::new();
        let mut run: Vec<Vec<String>> = Vec::new();

        for line in text.lines() {
            let cells = split_columns(line);
            if cells.len() >= self.min_columns {
                run.push(cells);
            } else {
                self.flush_run(page_number, &mut run, &mut tables);
            }
        }
        self.flush_run(page_number, &mut run, &mut tables);

        tables
    }

    fn flush_run(
        &self,
        page_number: u32,
        run: &mut Vec<Vec<String>>,
        tables: &mut Vec<DetectedTable>,
    ) {
        if run.len() >= self.min_rows {
            tables.push(DetectedTable {
                page_number,
                rows: std::mem::take(run),
            });
        } else {
            run.clear();
        }
    }
}

impl Default for TextTableDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TableEngine for TextTableDetector {
    fn detect(&self, pdf_path: &Path, max_pages: usize) -> Result<Vec<DetectedTable>> {
        let data = std::fs::read(pdf_path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&data).map_err(|e| {
            Error::extract(pdf_path.display().to_string(), format!("text layer: {}", e))
        })?;

        let mut tables = Vec::new();
        for (i, page_text) in pages.iter().enumerate().take(max_pages) {
            let page_number = i as u32 + 1;
            tables.extend(self.detect_in_text(page_number, page_text));
        }
        Ok(tables)
    }

    fn name(&self) -> &str {
        "text-layout"
    }
}

/// Split a line into cells on tabs or runs of two-plus spaces.
fn split_columns(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut space_run = 0usize;

    for ch in line.chars() {
        match ch {
            '\t' => {
                flush_cell(&mut current, &mut cells);
                space_run = 0;
            }
            ' ' => {
                space_run += 1;
                if space_run == 2 {
                    // The first space of the run was buffered; drop it.
                    current.pop();
                    flush_cell(&mut current, &mut cells);
                } else if space_run == 1 {
                    current.push(' ');
                }
            }
            _ => {
                space_run = 0;
                current.push(ch);
            }
        }
    }
    flush_cell(&mut current, &mut cells);
    cells
}

fn flush_cell(current: &mut String, cells: &mut Vec<String>) {
    let cell = current.trim();
    if !cell.is_empty() {
        cells.push(cell.to_string());
    }
    current.clear();
}
