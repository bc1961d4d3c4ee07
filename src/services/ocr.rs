// OCR Extraction Service
// Wraps the tesseract CLI; the frame is handed over through a scoped
// temp file that is removed when the guard drops

use async_trait::async_trait;
use image::DynamicImage;
use tokio::process::Command;
use tracing::debug;

use super::capabilities::{CapabilityError, OcrExtractor};

pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            language: "eng".to_string(),
        }
    }

    pub fn with_language(binary: &str, language: &str) -> Self {
        Self {
            binary: binary.to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl OcrExtractor for TesseractOcr {
    async fn extract_text(&self, image: &DynamicImage) -> Result<String, CapabilityError> {
        let frame = tempfile::Builder::new()
            .prefix("truthguard_ocr_")
            .suffix(".png")
            .tempfile()
            .map_err(|e| CapabilityError::ToolError(format!("temp file: {}", e)))?;

        image
            .save_with_format(frame.path(), image::ImageFormat::Png)
            .map_err(|e| CapabilityError::EncodeError(e.to_string()))?;

        let output = Command::new(&self.binary)
            .arg(frame.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| CapabilityError::ToolError(format!("{}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapabilityError::ToolError(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(chars = text.len(), "ocr.extracted");
        Ok(text)
    }
}
