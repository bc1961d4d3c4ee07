// TruthGuard Data Models
// Request/response types and pipeline outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Modality & Payload ============

/// Content type of an incoming verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Image => write!(f, "image"),
            Modality::Audio => write!(f, "audio"),
            Modality::Video => write!(f, "video"),
        }
    }
}

/// Raw uploaded content. Immutable and request-scoped.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub modality: Modality,
}

impl MediaPayload {
    pub fn new(bytes: Vec<u8>, modality: Modality) -> Self {
        Self { bytes, modality }
    }
}

// ============ Extraction ============

/// Canonical text produced by the per-modality extractors.
///
/// For video, `text` is the merged frame-OCR + transcript text and
/// `transcript` carries the audio portion on its own.
#[derive(Debug, Clone, Default)]
pub struct ExtractedSignal {
    pub text: String,
    pub transcript: Option<String>,
}

// ============ Classification ============

/// Result of one content-origin classification: truncated percentage
/// in [0,100] plus a banded verdict label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub percentage: i32,
    pub verdict: String,
}

// ============ Fact Verification ============

/// Fixed verdict vocabulary of the fact verification chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactVerdict {
    #[serde(rename = "Factually Correct")]
    FactuallyCorrect,
    #[serde(rename = "Factually Incorrect")]
    FactuallyIncorrect,
    #[serde(rename = "Partially Verifiable")]
    PartiallyVerifiable,
    #[serde(rename = "No Reliable Source Found")]
    NoReliableSource,
    #[serde(rename = "Uncertain")]
    Uncertain,
}

impl fmt::Display for FactVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FactVerdict::FactuallyCorrect => "Factually Correct",
            FactVerdict::FactuallyIncorrect => "Factually Incorrect",
            FactVerdict::PartiallyVerifiable => "Partially Verifiable",
            FactVerdict::NoReliableSource => "No Reliable Source Found",
            FactVerdict::Uncertain => "Uncertain",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of the fact verification chain. Evidence is never empty
/// on a non-error outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactOutcome {
    pub score: i32,
    pub verdict: FactVerdict,
    pub evidence: String,
}

// ============ Requests ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTextRequest {
    #[serde(default)]
    pub text: String,
}

// ============ Reports ============

/// Full text analysis: authorship classification + fact verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub ai_generated_probability: i32,
    pub authorship: String,
    pub accuracy_score: i32,
    pub accuracy_verdict: FactVerdict,
    pub evidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCheckReport {
    pub content_origin_score: i32,
    pub verdict: String,
    pub insights: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioCheckReport {
    pub audio_ai_probability: i32,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCheckReport {
    pub video_ai_probability: i32,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTextReport {
    pub extracted_text: String,
}

/// Compound report for the verify-*-text endpoints: the extracted
/// canonical text plus a full text analysis computed over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedAnalysisReport {
    pub extracted_text: String,
    pub analysis: TextAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribedAnalysisReport {
    pub transcribed_text: String,
    pub analysis: TextAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_verdict_serializes_to_display_strings() {
        let json = serde_json::to_string(&FactVerdict::NoReliableSource).unwrap();
        assert_eq!(json, "\"No Reliable Source Found\"");
        assert_eq!(
            FactVerdict::PartiallyVerifiable.to_string(),
            "Partially Verifiable"
        );
    }

    #[test]
    fn verify_text_request_defaults_to_empty() {
        let req: VerifyTextRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.text, "");
    }

    #[test]
    fn text_analysis_round_trips_wire_fields() {
        let analysis = TextAnalysis {
            ai_generated_probability: 82,
            authorship: "Likely AI-Generated".to_string(),
            accuracy_score: 95,
            accuracy_verdict: FactVerdict::FactuallyCorrect,
            evidence: "Karnataka is a state located in India, which is part of Asia.".to_string(),
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["ai_generated_probability"], 82);
        assert_eq!(json["accuracy_verdict"], "Factually Correct");
    }
}
