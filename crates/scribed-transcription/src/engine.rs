//! Speech engine trait and mock implementation.
//!
//! The pipeline depends on the [`SpeechEngine`] trait instead of a concrete
//! backend, which keeps request handling decoupled from inference code. The
//! ONNX-backed [`crate::whisper::WhisperEngine`] lives behind the `ort`
//! feature; [`MockSpeechEngine`] is always available for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use scribed_core::TranscribeError;

use crate::types::{AudioPrompt, GenerationOutput, SamplingConfig};

/// Contract implemented by speech-to-text engines.
///
/// The handle is constructed once per worker at startup and shared read-only
/// across all concurrent requests; implementations must be safe for
/// concurrent use.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Run one batched generation call.
    ///
    /// Returns exactly one [`GenerationOutput`] per prompt, in prompt order.
    /// A prompt the engine could not transcribe yields an output with no
    /// candidates rather than failing the batch.
    async fn generate(
        &self,
        prompts: Vec<AudioPrompt>,
        sampling: &SamplingConfig,
    ) -> Result<Vec<GenerationOutput>, TranscribeError>;
}

/// Deterministic in-memory engine for tests.
///
/// Produces one candidate per prompt describing the prompt's position and
/// duration, so assertions can check ordering without real inference.
/// Configurable to drop candidates for chosen prompts or to fail the whole
/// batch.
pub struct MockSpeechEngine {
    /// 0-based prompt positions that yield zero candidates.
    empty_at: Vec<usize>,
    /// Error message returned for every call when set.
    fail_with: Option<String>,
    called: AtomicBool,
}

impl Default for MockSpeechEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpeechEngine {
    /// Engine that transcribes every prompt.
    pub fn new() -> Self {
        Self {
            empty_at: Vec::new(),
            fail_with: None,
            called: AtomicBool::new(false),
        }
    }

    /// Yield zero candidates for the given 0-based prompt positions.
    pub fn with_empty_outputs(mut self, positions: &[usize]) -> Self {
        self.empty_at = positions.to_vec();
        self
    }

    /// Fail every generation call with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            empty_at: Vec::new(),
            fail_with: Some(message.into()),
            called: AtomicBool::new(false),
        }
    }

    /// Whether `generate` was invoked at least once.
    pub fn was_called(&self) -> bool {
        self.called.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEngine for MockSpeechEngine {
    async fn generate(
        &self,
        prompts: Vec<AudioPrompt>,
        _sampling: &SamplingConfig,
    ) -> Result<Vec<GenerationOutput>, TranscribeError> {
        self.called.store(true, Ordering::SeqCst);

        if let Some(ref message) = self.fail_with {
            return Err(TranscribeError::Generation(message.clone()));
        }

        Ok(prompts
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.empty_at.contains(&i) {
                    GenerationOutput::empty()
                } else {
                    GenerationOutput::text(format!(
                        "chunk {} ({:.1}s)",
                        i + 1,
                        p.duration_secs()
                    ))
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts(n: usize) -> Vec<AudioPrompt> {
        (0..n)
            .map(|_| AudioPrompt::for_chunk(vec![0.0; 16_000], 16_000))
            .collect()
    }

    #[tokio::test]
    async fn mock_returns_one_output_per_prompt_in_order() {
        let engine = MockSpeechEngine::new();
        let outputs = engine
            .generate(prompts(3), &SamplingConfig::default())
            .await
            .unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(outputs[0].candidates[0].starts_with("chunk 1"));
        assert!(outputs[2].candidates[0].starts_with("chunk 3"));
        assert!(engine.was_called());
    }

    #[tokio::test]
    async fn mock_empty_positions_have_no_candidates() {
        let engine = MockSpeechEngine::new().with_empty_outputs(&[1]);
        let outputs = engine
            .generate(prompts(3), &SamplingConfig::default())
            .await
            .unwrap();
        assert!(!outputs[0].candidates.is_empty());
        assert!(outputs[1].candidates.is_empty());
        assert!(!outputs[2].candidates.is_empty());
    }

    #[tokio::test]
    async fn mock_failure_is_generation_error() {
        let engine = MockSpeechEngine::failing("gpu fell off the bus");
        let err = engine
            .generate(prompts(1), &SamplingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscribeError::Generation(m) if m == "gpu fell off the bus"));
    }
}
