//! OCR engine boundary and the tesseract implementation

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};

/// OCR engine interface: image bytes in, extracted text out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// OCR via the tesseract binary, reading the image from stdin and writing
/// the recognized text to stdout.
pub struct TesseractOcr {
    command: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            command: "tesseract".to_string(),
        }
    }

    /// Use a non-default tesseract binary.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.command)
            .arg("stdin")
            .arg("stdout")
            .args(["--oem", "3"]) // LSTM + legacy engine
            .args(["--psm", "1"]) // automatic page segmentation with OSD
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Ocr(format!("failed to spawn {}: {}", self.command, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Ocr("tesseract stdin unavailable".into()))?;
        stdin.write_all(image).await?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Ocr(format!("tesseract failed: {}", e)))?;

        // Tesseract writes warnings to stderr but may still produce text.
        if !output.status.success() && output.stdout.is_empty() {
            return Err(Error::Ocr(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
