// Image Extraction
// Decode uploaded bytes and run OCR over the decoded image

use image::DynamicImage;

use crate::services::capabilities::OcrExtractor;

use super::{ExtractionError, NO_TEXT_IN_IMAGE};

/// Decode image bytes; malformed payloads become a DecodeError.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    image::load_from_memory(bytes).map_err(|e| ExtractionError::Decode(e.to_string()))
}

/// OCR a decoded image. The result is trimmed and may be empty.
pub async fn ocr_image(ocr: &dyn OcrExtractor, image: &DynamicImage) -> Result<String, ExtractionError> {
    let text = ocr.extract_text(image).await?;
    Ok(text.trim().to_string())
}

/// Image modality extraction for the verify path: decode, OCR, and
/// reject images with no readable text.
pub async fn extract_image_text(
    ocr: &dyn OcrExtractor,
    bytes: &[u8],
) -> Result<String, ExtractionError> {
    let decoded = decode_image(bytes)?;
    let text = ocr_image(ocr, &decoded).await?;
    if text.is_empty() {
        return Err(ExtractionError::EmptyContent(NO_TEXT_IN_IMAGE));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::capabilities::CapabilityError;
    use async_trait::async_trait;

    struct FixedOcr(&'static str);

    #[async_trait]
    impl OcrExtractor for FixedOcr {
        async fn extract_text(&self, _image: &DynamicImage) -> Result<String, CapabilityError> {
            Ok(self.0.to_string())
        }
    }

    fn png_fixture() -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(matches!(err, ExtractionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_extract_trims_ocr_output() {
        let text = extract_image_text(&FixedOcr("  hello\n"), &png_fixture())
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_extract_rejects_unreadable_image() {
        let err = extract_image_text(&FixedOcr("   \n"), &png_fixture())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), NO_TEXT_IN_IMAGE);
    }
}
