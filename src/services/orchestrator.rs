// Request Orchestration
// Single-pass driver per request: decode → extract → classify/verify →
// aggregate. This is the sole boundary where pipeline failures become
// structured error outcomes.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    AudioCheckReport, ClassificationOutcome, ExtractedAnalysisReport, ExtractedTextReport,
    ImageCheckReport, MediaPayload, TextAnalysis, TranscribedAnalysisReport, VideoCheckReport,
};

use super::capabilities::{CapabilityError, CapabilityRegistry};
use super::config_store::ToolConfig;
use super::extraction::{self, ExtractionError};
use super::verification::{
    audio_report, average_percentage, band, classify_confidence, image_report, text_report,
    verify_facts, video_report, AUDIO_WORDING, IMAGE_WORDING, TEXT_WORDING, VIDEO_WORDING,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

pub struct Orchestrator {
    registry: CapabilityRegistry,
    tools: ToolConfig,
}

impl Orchestrator {
    pub fn new(registry: CapabilityRegistry, tools: ToolConfig) -> Self {
        Self { registry, tools }
    }

    /// Authorship classification and the fact chain over canonical text.
    /// The two dimensions are independent and run concurrently.
    async fn analyze_text(&self, text: &str) -> Result<TextAnalysis, PipelineError> {
        let (confidence, fact) = tokio::join!(
            self.registry.text_classifier.classify_text(text),
            verify_facts(self.registry.knowledge.as_ref(), text),
        );
        let classification = classify_confidence(confidence?, &TEXT_WORDING);
        Ok(text_report(classification, fact))
    }

    pub async fn verify_text(&self, raw_text: &str) -> Result<TextAnalysis, PipelineError> {
        let request_id = Uuid::new_v4();
        let text = extraction::canonical_text(raw_text)?;
        info!(request_id = %request_id, chars = text.len(), "verify.text.extracted");
        let report = self.analyze_text(&text).await?;
        info!(
            request_id = %request_id,
            ai_probability = report.ai_generated_probability,
            accuracy = report.accuracy_score,
            "verify.text.done"
        );
        Ok(report)
    }

    pub async fn verify_image(
        &self,
        payload: MediaPayload,
    ) -> Result<ImageCheckReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let decoded = extraction::image::decode_image(&payload.bytes)?;
        let confidence = self.registry.image_classifier.classify_image(&decoded).await?;
        let report = image_report(classify_confidence(confidence, &IMAGE_WORDING));
        info!(
            request_id = %request_id,
            score = report.content_origin_score,
            "verify.image.done"
        );
        Ok(report)
    }

    /// Plain OCR endpoint: returns whatever trimmed text was found,
    /// even when empty.
    pub async fn extract_image_text(
        &self,
        payload: MediaPayload,
    ) -> Result<ExtractedTextReport, PipelineError> {
        let decoded = extraction::image::decode_image(&payload.bytes)?;
        let text = extraction::image::ocr_image(self.registry.ocr.as_ref(), &decoded).await?;
        Ok(ExtractedTextReport { extracted_text: text })
    }

    pub async fn verify_image_text(
        &self,
        payload: MediaPayload,
    ) -> Result<ExtractedAnalysisReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let text =
            extraction::image::extract_image_text(self.registry.ocr.as_ref(), &payload.bytes)
                .await?;
        info!(request_id = %request_id, chars = text.len(), "verify.image_text.extracted");
        let analysis = self.analyze_text(&text).await?;
        Ok(ExtractedAnalysisReport {
            extracted_text: text,
            analysis,
        })
    }

    pub async fn verify_audio(
        &self,
        payload: MediaPayload,
    ) -> Result<AudioCheckReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let waveform = extraction::audio::decode_waveform(&payload.bytes)?;
        let confidence = self
            .registry
            .audio_classifier
            .classify_audio(&waveform.samples, waveform.sample_rate)
            .await?;
        let report = audio_report(classify_confidence(confidence, &AUDIO_WORDING));
        info!(
            request_id = %request_id,
            score = report.audio_ai_probability,
            "verify.audio.done"
        );
        Ok(report)
    }

    pub async fn verify_audio_text(
        &self,
        payload: MediaPayload,
    ) -> Result<TranscribedAnalysisReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let transcript =
            extraction::audio::extract_transcript(self.registry.transcriber.as_ref(), &payload.bytes)
                .await?;
        info!(request_id = %request_id, chars = transcript.len(), "verify.audio_text.transcribed");
        let analysis = self.analyze_text(&transcript).await?;
        Ok(TranscribedAnalysisReport {
            transcribed_text: transcript,
            analysis,
        })
    }

    pub async fn verify_video(
        &self,
        payload: MediaPayload,
    ) -> Result<VideoCheckReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let confidences = extraction::video::sample_frame_confidences(
            &self.tools.ffmpeg_path,
            self.registry.image_classifier.as_ref(),
            &payload.bytes,
        )
        .await?;
        let percentage = average_percentage(&confidences);
        let report = video_report(ClassificationOutcome {
            percentage,
            verdict: band(percentage, &VIDEO_WORDING).to_string(),
        });
        info!(
            request_id = %request_id,
            frames = confidences.len(),
            score = report.video_ai_probability,
            "verify.video.done"
        );
        Ok(report)
    }

    pub async fn verify_video_text(
        &self,
        payload: MediaPayload,
    ) -> Result<ExtractedAnalysisReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let signal = extraction::video::extract_video_text(
            &self.tools.ffmpeg_path,
            self.registry.ocr.as_ref(),
            self.registry.transcriber.as_ref(),
            &payload.bytes,
        )
        .await?;
        info!(
            request_id = %request_id,
            chars = signal.text.len(),
            has_transcript = signal.transcript.is_some(),
            "verify.video_text.extracted"
        );
        let analysis = self.analyze_text(&signal.text).await?;
        Ok(ExtractedAnalysisReport {
            extracted_text: signal.text,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FactVerdict, Modality};
    use crate::services::capabilities::{
        AudioClassifier, ImageClassifier, KnowledgeLookup, LookupOutcome, OcrExtractor,
        TextClassifier, Transcriber,
    };
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::Arc;

    struct StubCapabilities {
        text_confidence: f64,
        ocr_reply: &'static str,
        transcript_reply: &'static str,
    }

    #[async_trait]
    impl TextClassifier for StubCapabilities {
        async fn classify_text(&self, _text: &str) -> Result<f64, CapabilityError> {
            Ok(self.text_confidence)
        }
    }

    #[async_trait]
    impl ImageClassifier for StubCapabilities {
        async fn classify_image(&self, _image: &DynamicImage) -> Result<f64, CapabilityError> {
            Ok(0.80)
        }
    }

    #[async_trait]
    impl AudioClassifier for StubCapabilities {
        async fn classify_audio(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
        ) -> Result<f64, CapabilityError> {
            Ok(0.42)
        }
    }

    #[async_trait]
    impl Transcriber for StubCapabilities {
        async fn transcribe(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
        ) -> Result<String, CapabilityError> {
            Ok(self.transcript_reply.to_string())
        }
    }

    #[async_trait]
    impl OcrExtractor for StubCapabilities {
        async fn extract_text(&self, _image: &DynamicImage) -> Result<String, CapabilityError> {
            Ok(self.ocr_reply.to_string())
        }
    }

    #[async_trait]
    impl KnowledgeLookup for StubCapabilities {
        async fn lookup(&self, _query: &str) -> Result<LookupOutcome, CapabilityError> {
            Err(CapabilityError::MissingContent)
        }
    }

    fn orchestrator(stub: StubCapabilities) -> Orchestrator {
        let stub = Arc::new(stub);
        let registry = CapabilityRegistry {
            text_classifier: stub.clone(),
            image_classifier: stub.clone(),
            audio_classifier: stub.clone(),
            transcriber: stub.clone(),
            ocr: stub.clone(),
            knowledge: stub,
        };
        Orchestrator::new(registry, ToolConfig::default())
    }

    fn stub() -> StubCapabilities {
        StubCapabilities {
            text_confidence: 0.91,
            ocr_reply: "sample text",
            transcript_reply: "spoken words",
        }
    }

    fn png_payload() -> MediaPayload {
        let mut cursor = std::io::Cursor::new(Vec::new());
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        MediaPayload::new(cursor.into_inner(), Modality::Image)
    }

    fn wav_payload() -> MediaPayload {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..800 {
            writer.write_sample(1000i16).unwrap();
        }
        writer.finalize().unwrap();
        MediaPayload::new(cursor.into_inner(), Modality::Audio)
    }

    #[tokio::test]
    async fn test_verify_text_rule_beats_unavailable_lookup() {
        let report = orchestrator(stub())
            .verify_text("The sun rises in the west")
            .await
            .unwrap();
        assert_eq!(report.accuracy_score, 5);
        assert_eq!(report.accuracy_verdict, FactVerdict::FactuallyIncorrect);
        assert_eq!(report.ai_generated_probability, 91);
        assert_eq!(report.authorship, "Likely AI-Generated");
    }

    #[tokio::test]
    async fn test_verify_text_unmatched_claim_resolves_uncertain() {
        let report = orchestrator(stub())
            .verify_text("An unverifiable novel claim")
            .await
            .unwrap();
        assert_eq!(report.accuracy_score, 40);
        assert_eq!(report.accuracy_verdict, FactVerdict::Uncertain);
    }

    #[tokio::test]
    async fn test_verify_text_rejects_empty() {
        let err = orchestrator(stub()).verify_text("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "No text provided");
    }

    #[tokio::test]
    async fn test_verify_image_boundary_confidence() {
        let report = orchestrator(stub()).verify_image(png_payload()).await.unwrap();
        assert_eq!(report.content_origin_score, 80);
        assert_eq!(report.verdict, "Likely AI-Generated Image");
    }

    #[tokio::test]
    async fn test_extract_image_text_allows_empty_result() {
        let mut capabilities = stub();
        capabilities.ocr_reply = "  \n";
        let report = orchestrator(capabilities)
            .extract_image_text(png_payload())
            .await
            .unwrap();
        assert_eq!(report.extracted_text, "");
    }

    #[tokio::test]
    async fn test_verify_image_text_rejects_unreadable() {
        let mut capabilities = stub();
        capabilities.ocr_reply = "";
        let err = orchestrator(capabilities)
            .verify_image_text(png_payload())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No readable text found in image");
    }

    #[tokio::test]
    async fn test_verify_audio_bands_low_confidence() {
        let report = orchestrator(stub()).verify_audio(wav_payload()).await.unwrap();
        assert_eq!(report.audio_ai_probability, 42);
        assert_eq!(report.verdict, "Likely Human Voice");
    }

    #[tokio::test]
    async fn test_verify_audio_text_carries_transcript() {
        let report = orchestrator(stub())
            .verify_audio_text(wav_payload())
            .await
            .unwrap();
        assert_eq!(report.transcribed_text, "spoken words");
        assert_eq!(report.analysis.ai_generated_probability, 91);
    }

    #[tokio::test]
    async fn test_verify_audio_decode_failure_surfaces() {
        let err = orchestrator(stub())
            .verify_audio(MediaPayload::new(b"garbage".to_vec(), Modality::Audio))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::Decode(_))
        ));
    }
}
