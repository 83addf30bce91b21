//! # scribed-transcription
//!
//! Turns raw audio bytes into a structured transcript using a shared
//! speech-to-text engine.
//!
//! # Architecture
//!
//! ```text
//! audio bytes → symphonia decode → mono f32 samples + native rate
//! → 30s chunk windows (last chunk truncated, never padded)
//! → one AudioPrompt per chunk, chunk order preserved
//! → single batched SpeechEngine::generate call (greedy sampling)
//! → TranscriptEntry per chunk (sentinel on empty output)
//! → TranscriptionReport with timing metrics
//! ```
//!
//! The concrete [`whisper::WhisperEngine`] (ONNX Runtime, feature `ort`)
//! resamples each chunk to 16 kHz internally; the pipeline itself keeps the
//! native sample rate.
//!
//! ## Crate Position
//!
//! Depends on: scribed-core.
//! Depended on by: scribed-server.

#![deny(unsafe_code)]

pub mod audio;
#[cfg(any(test, feature = "ort"))]
pub(crate) mod cell;
pub mod chunk;
pub mod engine;
pub mod model;
pub mod pipeline;
pub mod testutil;
pub mod types;

// Feature-gated (require ort + tokenizers + hf-hub + rubato)
#[cfg(feature = "ort")]
pub(crate) mod mel;
#[cfg(feature = "ort")]
pub mod whisper;

pub use engine::{MockSpeechEngine, SpeechEngine};
pub use pipeline::transcribe_audio_bytes;
pub use types::{
    AudioPrompt, GenerationOutput, SamplingConfig, TranscriptEntry, TranscriptionReport,
};
#[cfg(feature = "ort")]
pub use whisper::WhisperEngine;
