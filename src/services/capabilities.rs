// Capability Interfaces
// Long-lived, stateless-per-call model and lookup capabilities.
// Each interface is a trait so test doubles can be substituted
// without touching orchestration logic.

use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;

use super::config_store::AppConfig;
use super::inference::InferenceClient;
use super::knowledge::WikipediaLookup;
use super::ocr::TesseractOcr;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("External tool failed: {0}")]
    ToolError(String),
    #[error("Media encoding failed: {0}")]
    EncodeError(String),
}

/// Authorship classifier over canonical text. Returns the model's
/// confidence in [0,1] for the AI-generated class.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify_text(&self, text: &str) -> Result<f64, CapabilityError>;
}

/// Content-origin classifier over a decoded image.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify_image(&self, image: &DynamicImage) -> Result<f64, CapabilityError>;
}

/// Content-origin classifier over a mono waveform.
#[async_trait]
pub trait AudioClassifier: Send + Sync {
    async fn classify_audio(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<f64, CapabilityError>;
}

/// Speech-to-text over a mono waveform.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, samples: &[f32], sample_rate: u32)
        -> Result<String, CapabilityError>;
}

/// Optical character recognition over a decoded image.
#[async_trait]
pub trait OcrExtractor: Send + Sync {
    async fn extract_text(&self, image: &DynamicImage) -> Result<String, CapabilityError>;
}

/// Normalized outcome of an encyclopedia lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Direct page match with a short summary.
    Match { summary: String },
    /// The query resolved to a disambiguation page.
    Ambiguous,
    /// No page found for the query.
    NotFound,
}

/// Encyclopedia summary lookup used by the fact verification chain.
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<LookupOutcome, CapabilityError>;
}

/// Once-initialized registry of capabilities, shared read-only across
/// in-flight requests.
#[derive(Clone)]
pub struct CapabilityRegistry {
    pub text_classifier: Arc<dyn TextClassifier>,
    pub image_classifier: Arc<dyn ImageClassifier>,
    pub audio_classifier: Arc<dyn AudioClassifier>,
    pub transcriber: Arc<dyn Transcriber>,
    pub ocr: Arc<dyn OcrExtractor>,
    pub knowledge: Arc<dyn KnowledgeLookup>,
}

impl CapabilityRegistry {
    /// Build the production registry from config: hosted inference models,
    /// tesseract subprocess OCR, and the encyclopedia REST client.
    pub fn production(config: &AppConfig) -> Result<Self, CapabilityError> {
        let inference = Arc::new(InferenceClient::new(&config.inference)?);
        let ocr = Arc::new(TesseractOcr::new(&config.tools.tesseract_path));
        let knowledge = Arc::new(WikipediaLookup::new(&config.knowledge)?);

        Ok(Self {
            text_classifier: inference.clone(),
            image_classifier: inference.clone(),
            audio_classifier: inference.clone(),
            transcriber: inference,
            ocr,
            knowledge,
        })
    }
}
