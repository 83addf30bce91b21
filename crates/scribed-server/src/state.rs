//! Process-wide application state.
//!
//! One [`AppState`] is constructed at worker startup and cloned into every
//! handler via axum's `State` extractor — initialize once, read many, with
//! no hidden globals. The engine is the worker's model handle; the storage
//! client is constructed with it and shares its lifetime.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use scribed_transcription::SpeechEngine;

use crate::storage::ObjectStorageClient;

/// Shared per-worker state injected into request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The loaded model handle, shared read-only across requests.
    pub engine: Arc<dyn SpeechEngine>,
    /// Object storage client. Constructed at startup; not used by the
    /// request path today (reserved for a fetch-by-URI flow).
    pub storage: Arc<ObjectStorageClient>,
    /// Handle for rendering the `/metrics` endpoint.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Bundle the startup-constructed collaborators.
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        storage: ObjectStorageClient,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            engine,
            storage: Arc::new(storage),
            metrics,
        }
    }
}
