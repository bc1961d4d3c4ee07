// Hosted Inference Service
// Implements classifier and speech-to-text calls against the hosted
// model API (Hugging Face Inference wire format)

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::io::Cursor;
use std::time::Instant;
use tracing::debug;

use super::capabilities::{
    AudioClassifier, CapabilityError, ImageClassifier, TextClassifier, Transcriber,
};
use super::config_store::{get_api_key, InferenceConfig};

pub struct InferenceClient {
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
    audio_model: String,
    asr_model: String,
    api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AsrResponse {
    text: Option<String>,
}

impl InferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            audio_model: config.audio_model.clone(),
            asr_model: config.asr_model.clone(),
            api_key: get_api_key("inference"),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    async fn post_json(&self, model: &str, body: &Value) -> Result<Value, CapabilityError> {
        let start = Instant::now();
        let mut request = self
            .client
            .post(self.model_url(model))
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(
            model,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as i64,
            "inference.call"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CapabilityError::JsonError(e.to_string()))
    }

    async fn post_media(
        &self,
        model: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> Result<Value, CapabilityError> {
        let start = Instant::now();
        let mut request = self
            .client
            .post(self.model_url(model))
            .header("Content-Type", content_type)
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(
            model,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as i64,
            "inference.call"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CapabilityError::JsonError(e.to_string()))
    }
}

/// Pull the top prediction's score out of a classification response.
/// The API returns either `[{label, score}, ...]` or the same list nested
/// one level deeper, ordered by descending score.
fn top_score(value: &Value) -> Option<f64> {
    let mut current = value;
    while let Some(first) = current.as_array().and_then(|a| a.first()) {
        current = first;
    }
    current.get("score").and_then(|s| s.as_f64())
}

/// Encode a decoded image as PNG for upload.
fn png_bytes(image: &DynamicImage) -> Result<Vec<u8>, CapabilityError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| CapabilityError::EncodeError(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Encode a mono waveform as 16-bit PCM WAV for upload.
fn wav_bytes(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CapabilityError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| CapabilityError::EncodeError(e.to_string()))?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| CapabilityError::EncodeError(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| CapabilityError::EncodeError(e.to_string()))?;

    Ok(cursor.into_inner())
}

#[async_trait]
impl TextClassifier for InferenceClient {
    async fn classify_text(&self, text: &str) -> Result<f64, CapabilityError> {
        let body = serde_json::json!({ "inputs": text });
        let data = self.post_json(&self.text_model, &body).await?;
        top_score(&data).ok_or(CapabilityError::MissingContent)
    }
}

#[async_trait]
impl ImageClassifier for InferenceClient {
    async fn classify_image(&self, image: &DynamicImage) -> Result<f64, CapabilityError> {
        let bytes = png_bytes(image)?;
        let data = self.post_media(&self.image_model, bytes, "image/png").await?;
        top_score(&data).ok_or(CapabilityError::MissingContent)
    }
}

#[async_trait]
impl AudioClassifier for InferenceClient {
    async fn classify_audio(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<f64, CapabilityError> {
        let bytes = wav_bytes(samples, sample_rate)?;
        let data = self.post_media(&self.audio_model, bytes, "audio/wav").await?;
        top_score(&data).ok_or(CapabilityError::MissingContent)
    }
}

#[async_trait]
impl Transcriber for InferenceClient {
    async fn transcribe(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<String, CapabilityError> {
        let bytes = wav_bytes(samples, sample_rate)?;
        let data = self.post_media(&self.asr_model, bytes, "audio/wav").await?;
        let parsed: AsrResponse =
            serde_json::from_value(data).map_err(|e| CapabilityError::JsonError(e.to_string()))?;
        parsed.text.ok_or(CapabilityError::MissingContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_score_flat_list() {
        let data = serde_json::json!([
            {"label": "artificial", "score": 0.91},
            {"label": "human", "score": 0.09}
        ]);
        assert_eq!(top_score(&data), Some(0.91));
    }

    #[test]
    fn test_top_score_nested_list() {
        let data = serde_json::json!([[
            {"label": "Fake", "score": 0.73},
            {"label": "Real", "score": 0.27}
        ]]);
        assert_eq!(top_score(&data), Some(0.73));
    }

    #[test]
    fn test_top_score_missing() {
        let data = serde_json::json!({"error": "model loading"});
        assert_eq!(top_score(&data), None);
    }

    #[test]
    fn test_wav_bytes_header_and_length() {
        let samples = vec![0.0f32; 16000];
        let bytes = wav_bytes(&samples, 16000).unwrap();
        // RIFF header + 16-bit samples
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(bytes.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn test_png_bytes_signature() {
        let image = DynamicImage::new_rgb8(2, 2);
        let bytes = png_bytes(&image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_client_creation() {
        let client = InferenceClient::new(&InferenceConfig::default()).unwrap();
        assert!(client.model_url(&client.text_model).contains("/models/"));
    }
}
