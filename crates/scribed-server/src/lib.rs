//! # scribed-server
//!
//! HTTP surface for the transcription worker.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /ping` | Health check, fixed healthy status |
//! | `POST /invocations` | Raw audio bytes in, transcript JSON out |
//! | `GET /metrics` | Prometheus text rendering |
//!
//! All request-time failures funnel through [`error::ApiError`], the single
//! place that maps the closed error enumeration to HTTP statuses. Process
//! state lives in [`state::AppState`], constructed once at startup and
//! injected into handlers.
//!
//! ## Crate Position
//!
//! Depends on: scribed-core, scribed-transcription.
//! Depended on by: the scribed binary.

#![deny(unsafe_code)]

pub mod error;
pub mod http;
pub mod metrics;
pub mod state;
pub mod storage;

pub use http::router;
pub use state::AppState;
pub use storage::ObjectStorageClient;
