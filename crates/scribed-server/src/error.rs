//! The error-to-HTTP boundary.
//!
//! The only layer that turns [`TranscribeError`] into a status code: 400
//! for the missing-input case, 500 for everything else, both with a
//! `{"detail": "<message>"}` body. No distinction is made between transient
//! and permanent failures here.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scribed_core::TranscribeError;
use tracing::error;

/// HTTP-visible wrapper around the pipeline's closed error enumeration.
#[derive(Debug)]
pub struct ApiError(pub TranscribeError);

impl From<TranscribeError> for ApiError {
    fn from(err: TranscribeError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.0.to_string();
        if status.is_server_error() {
            error!(error = %self.0, "transcription request failed");
        }
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_maps_to_400() {
        let err = ApiError::from(TranscribeError::EmptyInput);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn decode_and_generation_map_to_500() {
        assert_eq!(
            ApiError::from(TranscribeError::Decode("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(TranscribeError::Generation("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
