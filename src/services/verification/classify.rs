// Classification Banding
// Converts classifier confidence into a truncated percentage and a
// three-band verdict, worded per modality

use crate::models::ClassificationOutcome;

/// Inclusive lower bound of the "Likely" band.
const LIKELY_THRESHOLD: i32 = 80;
/// Inclusive lower bound of the "Possibly" band.
const POSSIBLY_THRESHOLD: i32 = 50;

/// Per-modality verdict wording for the three bands.
#[derive(Debug, Clone, Copy)]
pub struct VerdictWording {
    pub likely: &'static str,
    pub possibly: &'static str,
    pub unlikely: &'static str,
}

pub const TEXT_WORDING: VerdictWording = VerdictWording {
    likely: "Likely AI-Generated",
    possibly: "Possibly AI-Generated",
    unlikely: "Likely Human-Written",
};

pub const IMAGE_WORDING: VerdictWording = VerdictWording {
    likely: "Likely AI-Generated Image",
    possibly: "Possibly AI-Generated Image",
    unlikely: "Likely Real Image",
};

pub const AUDIO_WORDING: VerdictWording = VerdictWording {
    likely: "Likely AI-Generated Audio",
    possibly: "Possibly AI-Generated Audio",
    unlikely: "Likely Human Voice",
};

pub const VIDEO_WORDING: VerdictWording = VerdictWording {
    likely: "Likely AI-Generated Video",
    possibly: "Possibly AI-Generated Video",
    unlikely: "Likely Real Video",
};

/// Truncate a [0,1] confidence toward zero into a percentage.
pub fn to_percentage(confidence: f64) -> i32 {
    ((confidence * 100.0) as i32).clamp(0, 100)
}

/// Band a percentage into its verdict label. Boundaries are inclusive
/// on the upper label.
pub fn band(percentage: i32, wording: &VerdictWording) -> &'static str {
    if percentage >= LIKELY_THRESHOLD {
        wording.likely
    } else if percentage >= POSSIBLY_THRESHOLD {
        wording.possibly
    } else {
        wording.unlikely
    }
}

/// Full adapter step: confidence in, banded outcome out.
pub fn classify_confidence(confidence: f64, wording: &VerdictWording) -> ClassificationOutcome {
    let percentage = to_percentage(confidence);
    ClassificationOutcome {
        percentage,
        verdict: band(percentage, wording).to_string(),
    }
}

/// Video sampling: mean of per-frame `confidence × 100`, truncated once.
/// Per-frame results are never individually banded.
pub fn average_percentage(confidences: &[f64]) -> i32 {
    if confidences.is_empty() {
        return 0;
    }
    let mean = confidences.iter().map(|c| c * 100.0).sum::<f64>() / confidences.len() as f64;
    (mean as i32).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_truncates_never_rounds() {
        assert_eq!(to_percentage(0.299), 29);
        assert_eq!(to_percentage(0.999), 99);
        assert_eq!(to_percentage(1.0), 100);
        assert_eq!(to_percentage(0.0), 0);
    }

    #[test]
    fn test_band_boundaries_are_inclusive_upward() {
        assert_eq!(band(to_percentage(0.80), &TEXT_WORDING), "Likely AI-Generated");
        assert_eq!(band(to_percentage(0.50), &TEXT_WORDING), "Possibly AI-Generated");
        assert_eq!(band(79, &TEXT_WORDING), "Possibly AI-Generated");
        assert_eq!(band(49, &TEXT_WORDING), "Likely Human-Written");
    }

    #[test]
    fn test_band_is_total_over_unit_interval() {
        let labels = [
            TEXT_WORDING.likely,
            TEXT_WORDING.possibly,
            TEXT_WORDING.unlikely,
        ];
        for i in 0..=100 {
            let verdict = band(to_percentage(i as f64 / 100.0), &TEXT_WORDING);
            assert!(labels.contains(&verdict));
        }
    }

    #[test]
    fn test_image_boundary_scenario() {
        let outcome = classify_confidence(0.80, &IMAGE_WORDING);
        assert_eq!(outcome.percentage, 80);
        assert_eq!(outcome.verdict, "Likely AI-Generated Image");
    }

    #[test]
    fn test_modality_wording() {
        assert_eq!(band(30, &AUDIO_WORDING), "Likely Human Voice");
        assert_eq!(band(30, &VIDEO_WORDING), "Likely Real Video");
        assert_eq!(band(85, &VIDEO_WORDING), "Likely AI-Generated Video");
    }

    #[test]
    fn test_average_percentage_truncates_once() {
        // mean of 79.0 and 80.5 is 79.75, truncated to 79
        assert_eq!(average_percentage(&[0.79, 0.805]), 79);
        assert_eq!(average_percentage(&[]), 0);
        assert_eq!(average_percentage(&[1.0, 1.0]), 100);
    }
}
