// Verdict Aggregation
// Pure combination of classification and fact outcomes into the
// per-endpoint report shapes. No I/O happens here.

use crate::models::{
    AudioCheckReport, ClassificationOutcome, FactOutcome, ImageCheckReport, TextAnalysis,
    VideoCheckReport,
};

const IMAGE_INSIGHT: &str = "Decision based on visual artifacts and texture patterns";

/// Text check: authorship classification + fact verification in one
/// report.
pub fn text_report(classification: ClassificationOutcome, fact: FactOutcome) -> TextAnalysis {
    TextAnalysis {
        ai_generated_probability: classification.percentage,
        authorship: classification.verdict,
        accuracy_score: fact.score,
        accuracy_verdict: fact.verdict,
        evidence: fact.evidence,
    }
}

/// Image AI-check: classification only, with the fixed insight string.
pub fn image_report(classification: ClassificationOutcome) -> ImageCheckReport {
    ImageCheckReport {
        content_origin_score: classification.percentage,
        verdict: classification.verdict,
        insights: IMAGE_INSIGHT.to_string(),
    }
}

/// Audio AI-check: classification only.
pub fn audio_report(classification: ClassificationOutcome) -> AudioCheckReport {
    AudioCheckReport {
        audio_ai_probability: classification.percentage,
        verdict: classification.verdict,
    }
}

/// Video AI-check: classification only, over the frame-averaged score.
pub fn video_report(classification: ClassificationOutcome) -> VideoCheckReport {
    VideoCheckReport {
        video_ai_probability: classification.percentage,
        verdict: classification.verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FactVerdict;

    #[test]
    fn test_text_report_combines_both_dimensions() {
        let report = text_report(
            ClassificationOutcome {
                percentage: 62,
                verdict: "Possibly AI-Generated".to_string(),
            },
            FactOutcome {
                score: 95,
                verdict: FactVerdict::FactuallyCorrect,
                evidence: "Karnataka is a state located in India, which is part of Asia."
                    .to_string(),
            },
        );
        assert_eq!(report.ai_generated_probability, 62);
        assert_eq!(report.authorship, "Possibly AI-Generated");
        assert_eq!(report.accuracy_score, 95);
        assert_eq!(report.accuracy_verdict, FactVerdict::FactuallyCorrect);
    }

    #[test]
    fn test_image_report_carries_fixed_insight() {
        let report = image_report(ClassificationOutcome {
            percentage: 80,
            verdict: "Likely AI-Generated Image".to_string(),
        });
        assert_eq!(report.content_origin_score, 80);
        assert_eq!(report.insights, IMAGE_INSIGHT);
    }
}
