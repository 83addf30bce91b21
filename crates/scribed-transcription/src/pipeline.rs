//! The transcription pipeline: raw audio bytes → structured transcript.
//!
//! Pure function of (engine, bytes). Steps: decode, chunk, build prompts,
//! one batched generate call, assemble entries, attach timing metrics. All
//! failures surface as [`TranscribeError`]; the HTTP layer owns the mapping
//! to status codes.

use std::time::Instant;

use scribed_core::TranscribeError;
use scribed_core::constants::NO_OUTPUT_SENTINEL;
use tracing::{debug, info};

use crate::audio::decode_audio_bytes;
use crate::chunk::split_chunks;
use crate::engine::SpeechEngine;
use crate::types::{
    AudioPrompt, GenerationOutput, SamplingConfig, TranscriptEntry, TranscriptionReport,
};

/// Transcribe raw audio bytes with a shared engine.
///
/// The caller guarantees `bytes` is non-empty; the HTTP boundary rejects
/// empty bodies before the pipeline runs. A valid stream that decodes to
/// zero samples produces an empty transcript with zero chunks processed.
pub async fn transcribe_audio_bytes(
    engine: &dyn SpeechEngine,
    bytes: &[u8],
) -> Result<TranscriptionReport, TranscribeError> {
    let decoded = decode_audio_bytes(bytes)?;

    let prompts: Vec<AudioPrompt> = split_chunks(&decoded.samples, decoded.sample_rate)
        .into_iter()
        .map(|chunk| AudioPrompt::for_chunk(chunk.to_vec(), decoded.sample_rate))
        .collect();
    let num_chunks = prompts.len();
    debug!(
        num_chunks,
        sample_rate = decoded.sample_rate,
        total_samples = decoded.samples.len(),
        "audio chunked"
    );

    let sampling = SamplingConfig::default();
    let start = Instant::now();
    let outputs = engine.generate(prompts, &sampling).await?;
    let elapsed = start.elapsed().as_secs_f64();

    if outputs.len() != num_chunks {
        return Err(TranscribeError::Generation(format!(
            "engine returned {} outputs for {num_chunks} prompts",
            outputs.len()
        )));
    }

    let transcript = assemble_transcript(&outputs);
    let report = TranscriptionReport {
        transcript,
        processing_time_seconds: round2(elapsed),
        chunks_processed: num_chunks,
        transcription_speed_chunks_per_second: chunks_per_second(num_chunks, elapsed),
    };

    info!(
        chunks = report.chunks_processed,
        seconds = report.processing_time_seconds,
        "transcription complete"
    );
    Ok(report)
}

/// Build transcript entries in output order with 1-based indices.
///
/// An output with no candidates degrades to the sentinel text for that
/// entry only; it never aborts the rest of the batch.
fn assemble_transcript(outputs: &[GenerationOutput]) -> Vec<TranscriptEntry> {
    outputs
        .iter()
        .enumerate()
        .map(|(i, output)| TranscriptEntry {
            chunk_index: i + 1,
            text: match output.candidates.first() {
                Some(text) => text.trim().to_owned(),
                None => NO_OUTPUT_SENTINEL.to_owned(),
            },
        })
        .collect()
}

/// Throughput metric, rounded to 2 decimals. Zero elapsed time is reported
/// as zero speed rather than dividing by zero.
fn chunks_per_second(num_chunks: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        round2(num_chunks as f64 / elapsed_secs)
    } else {
        0.0
    }
}

/// Round to 2 decimal places for the wire format.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
