// Verification Module
// Classification banding and fact verification core logic:
// - classify: confidence to percentage conversion and verdict banding
// - fact_chain: rule matcher with knowledge-lookup fallback
// - aggregate: pure combination of outcomes into endpoint reports

pub mod aggregate;
pub mod classify;
pub mod fact_chain;

pub use aggregate::{audio_report, image_report, text_report, video_report};
pub use classify::{
    average_percentage, band, classify_confidence, to_percentage, VerdictWording, AUDIO_WORDING,
    IMAGE_WORDING, TEXT_WORDING, VIDEO_WORDING,
};
pub use fact_chain::verify_facts;
