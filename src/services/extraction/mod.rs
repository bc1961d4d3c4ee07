// Modality Extraction
// Turns raw payload bytes into canonical text:
// - text: trim + empty check
// - image: decode + OCR
// - audio: WAV decode, downmix, 30 second cap, transcription
// - video: sampled frame OCR + audio track transcription merge

pub mod audio;
pub mod image;
pub mod video;

use thiserror::Error;

use crate::services::capabilities::CapabilityError;

pub const NO_TEXT_PROVIDED: &str = "No text provided";
pub const NO_TEXT_IN_IMAGE: &str = "No readable text found in image";
pub const NO_SPEECH_IN_AUDIO: &str = "No speech detected in audio";
pub const NO_TEXT_IN_VIDEO: &str = "No text found in video";
pub const NO_FRAMES_EXTRACTED: &str = "No frames extracted";

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Malformed media bytes; the message is surfaced verbatim.
    #[error("{0}")]
    Decode(String),
    /// Extraction ran but found nothing usable.
    #[error("{0}")]
    EmptyContent(&'static str),
    /// The external transcoding utility failed.
    #[error("Audio track extraction failed: {0}")]
    ExternalTool(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Text modality extraction: trim, reject empty input.
pub fn canonical_text(raw: &str) -> Result<String, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::EmptyContent(NO_TEXT_PROVIDED));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_text_trims() {
        assert_eq!(canonical_text("  hello world \n").unwrap(), "hello world");
    }

    #[test]
    fn test_canonical_text_rejects_whitespace_only() {
        let err = canonical_text("   \t\n").unwrap_err();
        assert_eq!(err.to_string(), NO_TEXT_PROVIDED);
    }
}
