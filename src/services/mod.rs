// TruthGuard Core Services
// Verification pipeline organized into specialized submodules:
// - capabilities: per-capability interfaces and the startup registry
// - inference: hosted classifier and speech-to-text clients
// - ocr: tesseract subprocess OCR
// - knowledge: encyclopedia summary lookup
// - extraction: per-modality canonical text extraction
// - verification: banding, fact chain, and verdict aggregation
// - orchestrator: per-request pipeline driver

pub mod capabilities;
pub mod config_store;
pub mod extraction;
pub mod inference;
pub mod knowledge;
pub mod ocr;
pub mod orchestrator;
pub mod verification;

pub use capabilities::{
    AudioClassifier, CapabilityError, CapabilityRegistry, ImageClassifier, KnowledgeLookup,
    LookupOutcome, OcrExtractor, TextClassifier, Transcriber,
};
pub use config_store::{get_api_key, load_config, AppConfig, ConfigStore};
pub use extraction::ExtractionError;
pub use inference::InferenceClient;
pub use knowledge::WikipediaLookup;
pub use ocr::TesseractOcr;
pub use orchestrator::{Orchestrator, PipelineError};
