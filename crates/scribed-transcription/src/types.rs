//! Core types for the transcription pipeline and engine seam.

use scribed_core::constants;

/// Deterministic sampling configuration for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Sampling temperature. Zero selects greedy decoding.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Maximum output tokens per prompt.
    pub max_tokens: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: constants::TEMPERATURE,
            top_p: constants::TOP_P,
            max_tokens: constants::MAX_OUTPUT_TOKENS,
        }
    }
}

/// Per-chunk input structure submitted to the generation call.
///
/// Derived 1:1 from a chunk; prompt order must exactly match chunk order
/// because result re-indexing downstream assumes it.
#[derive(Debug, Clone)]
pub struct AudioPrompt {
    /// Encoder text prefix. Always empty today.
    pub encoder_text: String,
    /// The chunk's samples (mono, native sample rate).
    pub samples: Vec<f32>,
    /// Sample rate shared by all chunks of one request.
    pub sample_rate: u32,
    /// Fixed decoder start marker.
    pub decoder_start: &'static str,
}

impl AudioPrompt {
    /// Build the prompt for one chunk.
    pub fn for_chunk(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            encoder_text: String::new(),
            samples,
            sample_rate,
            decoder_start: constants::DECODER_START_TOKEN,
        }
    }

    /// Chunk length in seconds at the prompt's sample rate.
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.samples.len() as u32) / f64::from(self.sample_rate)
    }
}

/// One generation result, in the same position as its source prompt.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// Candidate texts, best first. May be empty if the engine produced
    /// nothing for this prompt.
    pub candidates: Vec<String>,
}

impl GenerationOutput {
    /// A single-candidate output.
    pub fn text(text: impl Into<String>) -> Self {
        Self { candidates: vec![text.into()] }
    }

    /// An output with no candidates.
    pub fn empty() -> Self {
        Self { candidates: Vec::new() }
    }
}

/// One chunk's transcript, indexed to preserve chunk order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptEntry {
    /// 1-based index of the source chunk.
    pub chunk_index: usize,
    /// Generated text, or the error sentinel when the engine produced no
    /// candidates for this chunk.
    pub text: String,
}

/// Aggregate transcription response for one request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptionReport {
    /// Entries sorted by `chunk_index` ascending, starting at 1, no gaps.
    pub transcript: Vec<TranscriptEntry>,
    /// Wall-clock duration of the generation call, rounded to 2 decimals.
    pub processing_time_seconds: f64,
    /// Number of chunks submitted to the engine.
    pub chunks_processed: usize,
    /// `chunks_processed / processing_time_seconds` rounded to 2 decimals,
    /// or 0 when the elapsed time is exactly zero.
    pub transcription_speed_chunks_per_second: f64,
}
