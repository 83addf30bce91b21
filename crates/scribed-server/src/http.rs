//! Router construction and request handlers.

use std::time::Instant;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use metrics::{counter, histogram};
use scribed_core::TranscribeError;
use scribed_transcription::{TranscriptionReport, transcribe_audio_bytes};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::ApiError;
use crate::metrics::{
    CHUNKS_PROCESSED_TOTAL, INVOCATION_DURATION_SECONDS, INVOCATIONS_TOTAL, PING_TOTAL,
};
use crate::state::AppState;

/// Build the worker's router.
///
/// The default body limit is disabled: this layer imposes no size policy of
/// its own, matching the serving contract. Panics anywhere in a handler are
/// converted to 500 by the catch-panic layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/invocations", post(invocations))
        .route("/metrics", get(metrics_text))
        .layer(DefaultBodyLimit::disable())
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check. Fixed healthy status, no side effects; does not verify the
/// model handle.
async fn ping() -> Json<serde_json::Value> {
    counter!(PING_TOTAL).increment(1);
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Inference endpoint: whole body as opaque audio bytes in, transcript out.
async fn invocations(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TranscriptionReport>, ApiError> {
    let start = Instant::now();

    if body.is_empty() {
        counter!(INVOCATIONS_TOTAL, "status" => "empty").increment(1);
        return Err(TranscribeError::EmptyInput.into());
    }
    debug!(bytes = body.len(), "invocation received");

    match transcribe_audio_bytes(state.engine.as_ref(), &body).await {
        Ok(report) => {
            counter!(INVOCATIONS_TOTAL, "status" => "ok").increment(1);
            counter!(CHUNKS_PROCESSED_TOTAL).increment(report.chunks_processed as u64);
            histogram!(INVOCATION_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
            Ok(Json(report))
        }
        Err(err) => {
            counter!(INVOCATIONS_TOTAL, "status" => "error").increment(1);
            histogram!(INVOCATION_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
            Err(err.into())
        }
    }
}

/// Prometheus text rendering of the installed recorder.
async fn metrics_text(State(state): State<AppState>) -> String {
    crate::metrics::render(&state.metrics)
}
