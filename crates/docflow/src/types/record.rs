//! Chunk records: the unit of retrieval

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record class, one vector-index namespace per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Paragraph,
    Table,
    Image,
}

impl ChunkType {
    /// Stable lowercase name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Table => "table",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retrievable unit of document content.
///
/// The id is derived deterministically from the record's position within its
/// document, so re-extracting an unchanged document yields identical ids and
/// a re-upsert after queue redelivery overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    /// Empty only for image records prior to OCR enrichment
    pub chunk_text: String,
    /// Stem of the source file name
    pub document_id: String,
    /// 1-based page the content came from
    pub page_number: u32,
    pub chunk_type: ChunkType,
    /// 1-based position within its page (paragraphs) or table (tables)
    pub chunk_index: u32,
    /// 1-based table number within its page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_index: Option<u32>,
    /// 1-based image number within its page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_index: Option<u32>,
    /// Staged image file, for image records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Origin file reference
    pub source_path: String,
    pub created_at: DateTime<Utc>,
    /// Stamped by the OCR enricher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_processed_at: Option<DateTime<Utc>>,
}

impl ChunkRecord {
    /// Deterministic paragraph id: `{doc}#page{p}#para{n}`
    pub fn paragraph_id(document_id: &str, page: u32, chunk_index: u32) -> String {
        format!("{}#page{}#para{}", document_id, page, chunk_index)
    }

    /// Deterministic table id: `{doc}#page{p}#table{t}#chunk{n}`
    pub fn table_id(document_id: &str, page: u32, table_index: u32, chunk_index: u32) -> String {
        format!(
            "{}#page{}#table{}#chunk{}",
            document_id, page, table_index, chunk_index
        )
    }

    /// Deterministic image id: `{doc}#page{p}#img{k}`
    pub fn image_id(document_id: &str, page: u32, image_index: u32) -> String {
        format!("{}#page{}#img{}", document_id, page, image_index)
    }

    /// Create a paragraph record
    pub fn paragraph(
        document_id: &str,
        source_path: &str,
        page: u32,
        chunk_index: u32,
        chunk_text: String,
    ) -> Self {
        Self {
            id: Self::paragraph_id(document_id, page, chunk_index),
            chunk_text,
            document_id: document_id.to_string(),
            page_number: page,
            chunk_type: ChunkType::Paragraph,
            chunk_index,
            table_index: None,
            image_index: None,
            file_path: None,
            source_path: source_path.to_string(),
            created_at: Utc::now(),
            ocr_processed_at: None,
        }
    }

    /// Create a table record
    pub fn table(
        document_id: &str,
        source_path: &str,
        page: u32,
        table_index: u32,
        chunk_index: u32,
        chunk_text: String,
    ) -> Self {
        Self {
            id: Self::table_id(document_id, page, table_index, chunk_index),
            chunk_text,
            document_id: document_id.to_string(),
            page_number: page,
            chunk_type: ChunkType::Table,
            chunk_index,
            table_index: Some(table_index),
            image_index: None,
            file_path: None,
            source_path: source_path.to_string(),
            created_at: Utc::now(),
            ocr_processed_at: None,
        }
    }

    /// Create an image record with empty text; OCR fills the text later
    pub fn image(
        document_id: &str,
        source_path: &str,
        page: u32,
        image_index: u32,
        file_path: String,
    ) -> Self {
        Self {
            id: Self::image_id(document_id, page, image_index),
            chunk_text: String::new(),
            document_id: document_id.to_string(),
            page_number: page,
            chunk_type: ChunkType::Image,
            chunk_index: image_index,
            table_index: None,
            image_index: Some(image_index),
            file_path: Some(file_path),
            source_path: source_path.to_string(),
            created_at: Utc::now(),
            ocr_processed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deterministic() {
        let a = ChunkRecord::paragraph("report", "input/report.pdf", 3, 2, "text".into());
        let b = ChunkRecord::paragraph("report", "input/report.pdf", 3, 2, "text".into());
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "report#page3#para2");

        assert_eq!(
            ChunkRecord::table_id("report", 4, 1, 7),
            "report#page4#table1#chunk7"
        );
        assert_eq!(ChunkRecord::image_id("report", 2, 1), "report#page2#img1");
    }

    #[test]
    fn ids_are_unique_across_positions() {
        let mut seen = std::collections::HashSet::new();
        for page in 1..=3u32 {
            for idx in 1..=3u32 {
                assert!(seen.insert(ChunkRecord::paragraph_id("doc", page, idx)));
                assert!(seen.insert(ChunkRecord::table_id("doc", page, 1, idx)));
                assert!(seen.insert(ChunkRecord::image_id("doc", page, idx)));
            }
        }
    }

    #[test]
    fn image_record_serializes_without_table_fields() {
        let record = ChunkRecord::image("doc", "input/doc.pdf", 2, 1, "doc_page2_img1.png".into());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["chunk_type"], "image");
        assert_eq!(value["chunk_text"], "");
        assert_eq!(value["image_index"], 1);
        assert!(value.get("table_index").is_none());
        assert!(value.get("ocr_processed_at").is_none());
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = ChunkRecord::table("doc", "input/doc.pdf", 5, 2, 1, "a,b\n1,2\n".into());
        let raw = serde_json::to_string(&record).unwrap();
        let back: ChunkRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.chunk_type, ChunkType::Table);
        assert_eq!(back.table_index, Some(2));
    }
}
