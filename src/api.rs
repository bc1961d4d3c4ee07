// HTTP API
// axum router and handlers. Every endpoint answers HTTP 200 and
// distinguishes outcomes via the body's `status` field; no internal
// failure maps to a non-200 response.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::models::{MediaPayload, Modality, VerifyTextRequest};
use crate::services::{Orchestrator, PipelineError};

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/verify", post(verify_text))
        .route("/verify-image", post(verify_image))
        .route("/extract-text", post(extract_text))
        .route("/verify-image-text", post(verify_image_text))
        .route("/verify-audio", post(verify_audio))
        .route("/verify-audio-text", post(verify_audio_text))
        .route("/verify-video", post(verify_video))
        .route("/verify-video-text", post(verify_video_text))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct Success<T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

#[derive(Serialize)]
struct Failure {
    status: &'static str,
    message: String,
}

fn failure(message: String) -> Response {
    Json(Failure {
        status: "error",
        message,
    })
    .into_response()
}

fn respond<T: Serialize>(result: Result<T, PipelineError>) -> Response {
    match result {
        Ok(body) => Json(Success {
            status: "success",
            body,
        })
        .into_response(),
        Err(e) => {
            warn!("request resolved to error outcome: {}", e);
            failure(e.to_string())
        }
    }
}

/// Pull the first uploaded file out of a multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid upload: {}", e))?
    {
        if field.file_name().is_some() || field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|e| format!("Failed to read upload: {}", e));
        }
    }
    Err("No file uploaded".to_string())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "TruthGuard Backend Running" }))
}

async fn verify_text(
    State(state): State<AppState>,
    payload: Option<Json<VerifyTextRequest>>,
) -> Response {
    let text = payload.map(|Json(request)| request.text).unwrap_or_default();
    respond(state.orchestrator.verify_text(&text).await)
}

async fn verify_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Image);
    respond(state.orchestrator.verify_image(payload).await)
}

async fn extract_text(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Image);
    respond(state.orchestrator.extract_image_text(payload).await)
}

async fn verify_image_text(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Image);
    respond(state.orchestrator.verify_image_text(payload).await)
}

async fn verify_audio(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Audio);
    respond(state.orchestrator.verify_audio(payload).await)
}

async fn verify_audio_text(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Audio);
    respond(state.orchestrator.verify_audio_text(payload).await)
}

async fn verify_video(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Video);
    respond(state.orchestrator.verify_video(payload).await)
}

async fn verify_video_text(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(message) => return failure(message),
    };
    let payload = MediaPayload::new(bytes, Modality::Video);
    respond(state.orchestrator.verify_video_text(payload).await)
}
