//! Fixed serving configuration.
//!
//! These values are deliberately constants, not settings: they describe the
//! model contract the worker was built for, and changing them requires
//! re-validating the deployment. Only host/port/model-dir are runtime knobs
//! (see the binary's CLI).

/// Logical model identifier served by this worker.
pub const MODEL_ID: &str = "openai/whisper-large-v3-turbo";

/// Duration of one audio chunk in seconds. The unit of batched generation.
pub const CHUNK_DURATION_SECS: u32 = 30;

/// Maximum decoder sequence length supported by the model (tokens).
pub const MAX_MODEL_LEN: usize = 448;

/// Admission cap on concurrently decoding sequences. The ONNX backend
/// decodes prompts one at a time, which stays within this cap trivially;
/// the value records the serving contract for backends that batch.
pub const MAX_NUM_SEQS: usize = 200;

/// Decoder start marker prepended to every prompt.
pub const DECODER_START_TOKEN: &str = "<|startoftranscript|>";

/// Sampling temperature. Zero means greedy, reproducible decoding.
pub const TEMPERATURE: f32 = 0.0;

/// Nucleus sampling mass. Full mass — no truncation.
pub const TOP_P: f32 = 1.0;

/// Generous per-chunk output token budget.
pub const MAX_OUTPUT_TOKENS: usize = 4096;

/// Transcript text substituted when the engine yields no candidates for a
/// chunk. Degrades that entry only; the rest of the batch is unaffected.
pub const NO_OUTPUT_SENTINEL: &str = "[ERROR: No transcription generated]";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_deterministic() {
        assert_eq!(TEMPERATURE, 0.0);
        assert_eq!(TOP_P, 1.0);
    }

    #[test]
    fn chunking_contract() {
        assert_eq!(CHUNK_DURATION_SECS, 30);
        // 30s at 16kHz must fit usize math comfortably.
        let _ = CHUNK_DURATION_SECS as usize * 16_000;
    }

    #[test]
    fn sequence_budgets_are_consistent() {
        // The per-chunk output budget must not be the binding limit below
        // the model's own sequence cap.
        assert!(MAX_OUTPUT_TOKENS >= MAX_MODEL_LEN);
        assert!(MAX_NUM_SEQS >= 1);
    }
}
