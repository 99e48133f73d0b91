//! Handlers for the facade endpoints.
//!
//! Handlers are thin: parse, consult the cache, delegate to the blocking
//! synthesis entry point on the blocking pool, encode, respond. Request
//! bodies are co-located here to keep the handler surface self-contained.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use voxflow_core::{CrossfadeMixer, encode_wav};
use voxflow_pipeline::{probe, synthesize};

use crate::error::HttpError;
use crate::state::AppState;

// ── Request/response shapes ──

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub backend: String,
}

// ── Handlers ──

/// `POST /speak` — synthesize the request text and return it as WAV.
pub async fn speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> Result<Response, HttpError> {
    let text = request.text.trim().to_owned();
    if text.is_empty() {
        return Err(HttpError::BadRequest("text must not be empty".into()));
    }

    if let Some(wav) = state.cache.lock().await.get(&text) {
        debug!(chars = text.len(), "cache hit");
        return Ok(wav_response(wav.as_slice().to_vec()));
    }

    let config = state.pipeline.clone();
    let request_text = text.clone();
    let chunks = tokio::task::spawn_blocking(move || synthesize(&request_text, &config))
        .await
        .map_err(|err| HttpError::Internal(err.to_string()))?;

    // Every sentence failing means the backend never answered at all.
    if !chunks.is_empty() && chunks.iter().all(Option::is_none) {
        return Err(HttpError::BackendUnavailable(format!(
            "synthesis backend at {} did not answer",
            state.pipeline.backend_addr()
        )));
    }

    let mixer = CrossfadeMixer::new(state.pipeline.overlap());
    let samples = mixer.mix_chunks(&chunks);
    let wav = encode_wav(&samples, state.pipeline.sample_rate)
        .map_err(|err| HttpError::Internal(err.to_string()))?;

    info!(
        sentences = chunks.len(),
        samples = samples.len(),
        bytes = wav.len(),
        "utterance synthesized"
    );
    state.cache.lock().await.insert(text, wav.clone());
    Ok(wav_response(wav))
}

/// `GET /status` — probe backend reachability.
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, HttpError> {
    let config = state.pipeline.clone();
    let reachable = tokio::task::spawn_blocking(move || probe(&config))
        .await
        .map_err(|err| HttpError::Internal(err.to_string()))?;

    if reachable {
        Ok(Json(StatusResponse {
            status: "ok",
            backend: state.pipeline.backend_addr(),
        }))
    } else {
        Err(HttpError::BackendUnavailable(format!(
            "synthesis backend at {} is not reachable",
            state.pipeline.backend_addr()
        )))
    }
}

fn wav_response(wav: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "audio/wav")], wav).into_response()
}
