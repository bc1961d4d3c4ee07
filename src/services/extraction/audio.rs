// Audio Extraction
// WAV decode, multi-channel downmix, 30 second transcription cap

use hound::{SampleFormat, WavReader};
use std::io::Cursor;

use crate::services::capabilities::{CapabilityError, Transcriber};

use super::{ExtractionError, NO_SPEECH_IN_AUDIO};

/// Hard cap on transcribed audio. Samples past this window are
/// discarded, never processed.
pub const MAX_TRANSCRIBE_SECS: u32 = 30;

/// A decoded mono waveform.
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode WAV bytes into a mono waveform. Multi-channel input is
/// downmixed by per-sample arithmetic mean across channels.
pub fn decode_waveform(bytes: &[u8]) -> Result<Waveform, ExtractionError> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| ExtractionError::Decode(e.to_string()))?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(|e| ExtractionError::Decode(e.to_string()))?
        }
    };

    Ok(Waveform {
        samples: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

/// Per-sample mean across interleaved channels.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Truncate a waveform to the first `sample_rate × 30` samples.
pub fn cap_to_transcription_window(samples: &mut Vec<f32>, sample_rate: u32) {
    let max_samples = sample_rate as usize * MAX_TRANSCRIBE_SECS as usize;
    if samples.len() > max_samples {
        samples.truncate(max_samples);
    }
}

/// Cap and transcribe a mono waveform. The returned transcript is
/// trimmed and may be empty.
pub async fn transcribe_waveform(
    transcriber: &dyn Transcriber,
    mut waveform: Waveform,
) -> Result<String, CapabilityError> {
    cap_to_transcription_window(&mut waveform.samples, waveform.sample_rate);
    let text = transcriber
        .transcribe(&waveform.samples, waveform.sample_rate)
        .await?;
    Ok(text.trim().to_string())
}

/// Audio modality extraction: decode, downmix, cap, transcribe, and
/// reject audio in which no speech was detected.
pub async fn extract_transcript(
    transcriber: &dyn Transcriber,
    bytes: &[u8],
) -> Result<String, ExtractionError> {
    let waveform = decode_waveform(bytes)?;
    let transcript = transcribe_waveform(transcriber, waveform).await?;
    if transcript.is_empty() {
        return Err(ExtractionError::EmptyContent(NO_SPEECH_IN_AUDIO));
    }
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CapturingTranscriber {
        seen_samples: Mutex<usize>,
        reply: &'static str,
    }

    impl CapturingTranscriber {
        fn new(reply: &'static str) -> Self {
            Self {
                seen_samples: Mutex::new(0),
                reply,
            }
        }
    }

    #[async_trait]
    impl Transcriber for CapturingTranscriber {
        async fn transcribe(
            &self,
            samples: &[f32],
            _sample_rate: u32,
        ) -> Result<String, CapabilityError> {
            *self.seen_samples.lock().unwrap() = samples.len();
            Ok(self.reply.to_string())
        }
    }

    fn wav_fixture(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mono_wav() {
        let bytes = wav_fixture(&[0, i16::MAX / 2, i16::MIN / 2], 1, 16000);
        let waveform = decode_waveform(&bytes).unwrap();
        assert_eq!(waveform.sample_rate, 16000);
        assert_eq!(waveform.samples.len(), 3);
        assert!((waveform.samples[1] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_waveform(b"noise").unwrap_err(),
            ExtractionError::Decode(_)
        ));
    }

    #[test]
    fn test_downmix_stereo_means_channels() {
        let mixed = downmix(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mixed, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_decode_stereo_downmixes_to_mono() {
        let bytes = wav_fixture(&[1000, 3000, 2000, 4000], 2, 8000);
        let waveform = decode_waveform(&bytes).unwrap();
        assert_eq!(waveform.samples.len(), 2);
    }

    #[tokio::test]
    async fn test_transcription_receives_exactly_thirty_seconds() {
        let sample_rate = 100u32;
        let total = (sample_rate as usize) * 45;
        let waveform = Waveform {
            samples: vec![0.1; total],
            sample_rate,
        };
        let transcriber = CapturingTranscriber::new("hello");
        transcribe_waveform(&transcriber, waveform).await.unwrap();
        assert_eq!(
            *transcriber.seen_samples.lock().unwrap(),
            sample_rate as usize * MAX_TRANSCRIBE_SECS as usize
        );
    }

    #[tokio::test]
    async fn test_short_audio_is_not_padded() {
        let waveform = Waveform {
            samples: vec![0.1; 50],
            sample_rate: 100,
        };
        let transcriber = CapturingTranscriber::new("hello");
        transcribe_waveform(&transcriber, waveform).await.unwrap();
        assert_eq!(*transcriber.seen_samples.lock().unwrap(), 50);
    }

    #[tokio::test]
    async fn test_extract_rejects_silent_audio() {
        let bytes = wav_fixture(&[0; 100], 1, 8000);
        let transcriber = CapturingTranscriber::new("  \n");
        let err = extract_transcript(&transcriber, &bytes).await.unwrap_err();
        assert_eq!(err.to_string(), NO_SPEECH_IN_AUDIO);
    }
}
