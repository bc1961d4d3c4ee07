// Video Extraction
// ffmpeg-backed frame sampling and audio track extraction. All decoded
// artifacts live in a scoped temp directory removed on every exit path;
// removal failures are swallowed by the guard.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::models::ExtractedSignal;
use crate::services::capabilities::{ImageClassifier, OcrExtractor, Transcriber};

use super::audio::{decode_waveform, transcribe_waveform};
use super::{ExtractionError, NO_FRAMES_EXTRACTED, NO_TEXT_IN_VIDEO};

/// Every 60th frame is OCR'd on the fact-check path.
pub const OCR_FRAME_INTERVAL: u32 = 60;
/// Every 30th frame feeds the content-origin check.
pub const CLASSIFY_FRAME_INTERVAL: u32 = 30;
/// OCR accumulation stops after this many non-empty results.
pub const MAX_OCR_TEXTS: usize = 5;
/// Content-origin sampling stops after this many frames.
pub const MAX_CLASSIFY_FRAMES: usize = 10;

/// Scoped workspace holding the staged container file and any frames
/// or audio extracted from it.
struct Workspace {
    dir: TempDir,
    video_path: PathBuf,
}

async fn stage_payload(bytes: &[u8]) -> Result<Workspace, ExtractionError> {
    let dir = tempfile::Builder::new()
        .prefix("truthguard_video_")
        .tempdir()
        .map_err(|e| ExtractionError::Decode(format!("Failed to stage video: {}", e)))?;
    let video_path = dir.path().join("input.mp4");
    tokio::fs::write(&video_path, bytes)
        .await
        .map_err(|e| ExtractionError::Decode(format!("Failed to stage video: {}", e)))?;
    Ok(Workspace { dir, video_path })
}

fn last_stderr_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("unknown error")
        .trim()
        .to_string()
}

/// Dump every `interval`-th frame of the stream as PNG files, in stream
/// order, optionally capped at `limit` frames.
async fn sample_frames(
    ffmpeg: &str,
    video_path: &Path,
    out_dir: &Path,
    interval: u32,
    limit: Option<usize>,
) -> Result<Vec<PathBuf>, ExtractionError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| ExtractionError::Decode(format!("Failed to stage frames: {}", e)))?;

    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-y")
        .arg("-i")
        .arg(video_path)
        .arg("-vf")
        .arg(format!("select=not(mod(n\\,{}))", interval))
        .arg("-vsync")
        .arg("vfr");
    if let Some(limit) = limit {
        cmd.arg("-frames:v").arg(limit.to_string());
    }
    cmd.arg(out_dir.join("frame_%05d.png"));

    let output = cmd
        .output()
        .await
        .map_err(|e| ExtractionError::Decode(format!("{}: {}", ffmpeg, e)))?;
    if !output.status.success() {
        return Err(ExtractionError::Decode(format!(
            "Failed to decode video frames: {}",
            last_stderr_line(&output.stderr)
        )));
    }

    let mut frames: Vec<PathBuf> = std::fs::read_dir(out_dir)
        .map_err(|e| ExtractionError::Decode(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "png"))
        .collect();
    frames.sort();
    debug!(interval, frames = frames.len(), "video.frames_sampled");
    Ok(frames)
}

/// Extract the audio track as mono 16kHz 16-bit PCM. A transcoder
/// failure is surfaced, never silently swallowed.
async fn extract_audio_track(
    ffmpeg: &str,
    video_path: &Path,
    audio_path: &Path,
) -> Result<(), ExtractionError> {
    let output = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(video_path)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
        .arg(audio_path)
        .output()
        .await
        .map_err(|e| ExtractionError::ExternalTool(format!("{}: {}", ffmpeg, e)))?;

    if !output.status.success() {
        return Err(ExtractionError::ExternalTool(last_stderr_line(
            &output.stderr,
        )));
    }
    Ok(())
}

/// OCR sampled frames in order, accumulating non-empty results until
/// `MAX_OCR_TEXTS` are collected or the frames run out. Frames that fail
/// to decode are skipped.
async fn accumulate_frame_texts(
    ocr: &dyn OcrExtractor,
    frames: &[PathBuf],
) -> Result<Vec<String>, ExtractionError> {
    let mut texts = Vec::new();
    for path in frames {
        if texts.len() >= MAX_OCR_TEXTS {
            break;
        }
        let frame = match image::open(path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(frame = %path.display(), "skipping undecodable frame: {}", e);
                continue;
            }
        };
        let text = ocr.extract_text(&frame).await?;
        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }
    Ok(texts)
}

/// Classify sampled frames in order, capped at `MAX_CLASSIFY_FRAMES`
/// confidences. Frames that fail to decode are skipped.
async fn classify_sampled_frames(
    classifier: &dyn ImageClassifier,
    frames: &[PathBuf],
) -> Result<Vec<f64>, ExtractionError> {
    let mut confidences = Vec::new();
    for path in frames {
        if confidences.len() >= MAX_CLASSIFY_FRAMES {
            break;
        }
        let frame = match image::open(path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(frame = %path.display(), "skipping undecodable frame: {}", e);
                continue;
            }
        };
        confidences.push(classifier.classify_image(&frame).await?);
    }
    Ok(confidences)
}

/// Merge accumulated frame text and the audio transcript. Both empty is
/// a terminal empty-content failure.
pub fn merge_video_text(frame_text: &str, transcript: &str) -> Result<String, ExtractionError> {
    match (frame_text.is_empty(), transcript.is_empty()) {
        (false, false) => Ok(format!("{} {}", frame_text, transcript)),
        (false, true) => Ok(frame_text.to_string()),
        (true, false) => Ok(transcript.to_string()),
        (true, true) => Err(ExtractionError::EmptyContent(NO_TEXT_IN_VIDEO)),
    }
}

/// Fact-check path extraction: frame OCR at the 60-frame cadence plus
/// the transcribed audio track, merged into canonical text.
pub async fn extract_video_text(
    ffmpeg: &str,
    ocr: &dyn OcrExtractor,
    transcriber: &dyn Transcriber,
    bytes: &[u8],
) -> Result<ExtractedSignal, ExtractionError> {
    let workspace = stage_payload(bytes).await?;

    let frames_dir = workspace.dir.path().join("ocr_frames");
    let frames = sample_frames(
        ffmpeg,
        &workspace.video_path,
        &frames_dir,
        OCR_FRAME_INTERVAL,
        None,
    )
    .await?;
    let texts = accumulate_frame_texts(ocr, &frames).await?;

    let audio_path = workspace.dir.path().join("audio.wav");
    extract_audio_track(ffmpeg, &workspace.video_path, &audio_path).await?;
    let audio_bytes = tokio::fs::read(&audio_path)
        .await
        .map_err(|e| ExtractionError::ExternalTool(e.to_string()))?;
    let waveform = decode_waveform(&audio_bytes)?;
    let transcript = transcribe_waveform(transcriber, waveform).await?;

    let frame_text = texts.join(" ");
    let merged = merge_video_text(&frame_text, &transcript)?;

    Ok(ExtractedSignal {
        text: merged,
        transcript: (!transcript.is_empty()).then_some(transcript),
    })
}

/// Content-origin path extraction: per-frame classifier confidences at
/// the 30-frame cadence, capped at 10 samples.
pub async fn sample_frame_confidences(
    ffmpeg: &str,
    classifier: &dyn ImageClassifier,
    bytes: &[u8],
) -> Result<Vec<f64>, ExtractionError> {
    let workspace = stage_payload(bytes).await?;

    let frames_dir = workspace.dir.path().join("classify_frames");
    let frames = sample_frames(
        ffmpeg,
        &workspace.video_path,
        &frames_dir,
        CLASSIFY_FRAME_INTERVAL,
        Some(MAX_CLASSIFY_FRAMES),
    )
    .await?;
    let confidences = classify_sampled_frames(classifier, &frames).await?;

    if confidences.is_empty() {
        return Err(ExtractionError::EmptyContent(NO_FRAMES_EXTRACTED));
    }
    Ok(confidences)
}
