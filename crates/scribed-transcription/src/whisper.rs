//! ONNX Runtime whisper engine (feature-gated behind `ort`).
//!
//! Runs the `onnx-community/whisper-large-v3-turbo` export: per prompt,
//! resample to 16 kHz (rubato), log-mel features, encoder session, then a
//! greedy decoder loop from the decoder-start token. Temperature 0 in the
//! serving contract means plain argmax at every step — no sampling state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use scribed_core::constants::MAX_MODEL_LEN;
use scribed_core::{ResultExt, TranscribeError};
use tracing::{debug, info};

use crate::cell::BlockingCell;
use crate::engine::SpeechEngine;
use crate::mel;
use crate::model::ModelPaths;
use crate::types::{AudioPrompt, GenerationOutput, SamplingConfig};

/// Combined session + tokenizer state behind a single lock.
struct InferenceState {
    encoder: ort::session::Session,
    decoder: ort::session::Session,
    tokenizer: tokenizers::Tokenizer,
    start_token: u32,
    end_token: u32,
}

/// The loaded speech-to-text model handle.
///
/// Created once per worker at startup, immutable thereafter, shared
/// read-only by all requests. Generation calls serialize on an async lock:
/// a concurrent caller queues behind the in-flight one rather than being
/// rejected.
pub struct WhisperEngine {
    model_dir: PathBuf,
    state: BlockingCell<InferenceState>,
    ready: AtomicBool,
}

impl WhisperEngine {
    /// Create an engine rooted at `model_dir` (not yet initialized).
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            state: BlockingCell::new(),
            ready: AtomicBool::new(false),
        }
    }

    /// Load sessions and tokenizer from the model directory.
    ///
    /// Does blocking I/O internally; failures here are startup-fatal for
    /// the worker.
    pub async fn initialize(&self) -> Result<(), TranscribeError> {
        let dir = self.model_dir.clone();
        let state = tokio::task::spawn_blocking(move || {
            initialize_inner(&dir).map_err(|e| TranscribeError::Generation(e.to_string()))
        })
        .await
        .generation("init task join")??;

        self.state.put(state).await;
        self.ready.store(true, Ordering::SeqCst);
        info!(model_dir = %self.model_dir.display(), "whisper engine ready");
        Ok(())
    }

    /// Whether the model handle is loaded.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEngine for WhisperEngine {
    async fn generate(
        &self,
        prompts: Vec<AudioPrompt>,
        sampling: &SamplingConfig,
    ) -> Result<Vec<GenerationOutput>, TranscribeError> {
        if !self.is_ready() {
            return Err(TranscribeError::Generation("engine not initialized".into()));
        }

        self.state
            .with_blocking(|state| run_batch(state, &prompts, sampling))
            .await
            .map_err(|e| TranscribeError::Generation(e.to_string()))?
    }
}

/// Build ONNX sessions and tokenizer from the model directory.
///
/// Uses `Box<dyn Error>` internally so all calls can use `?` directly; the
/// caller maps the error to [`TranscribeError::Generation`] at the boundary.
fn initialize_inner(
    model_dir: &Path,
) -> std::result::Result<InferenceState, Box<dyn std::error::Error + Send + Sync>> {
    let paths = ModelPaths::from_dir(model_dir);
    if !paths.all_exist() {
        return Err(format!("model files missing under {}", model_dir.display()).into());
    }

    let tokenizer = tokenizers::Tokenizer::from_file(&paths.tokenizer)
        .map_err(|e| format!("tokenizer load: {e}"))?;
    let start_token = tokenizer
        .token_to_id("<|startoftranscript|>")
        .ok_or("tokenizer missing <|startoftranscript|>")?;
    let end_token = tokenizer
        .token_to_id("<|endoftext|>")
        .ok_or("tokenizer missing <|endoftext|>")?;

    let encoder = ort::session::Session::builder()?
        .with_intra_threads(2)?
        .with_log_level(ort::logging::LogLevel::Warning)?
        .commit_from_file(&paths.encoder)?;
    let decoder = ort::session::Session::builder()?
        .with_intra_threads(2)?
        .with_log_level(ort::logging::LogLevel::Warning)?
        .commit_from_file(&paths.decoder)?;

    info!(model_dir = %model_dir.display(), "ONNX sessions loaded");
    Ok(InferenceState { encoder, decoder, tokenizer, start_token, end_token })
}

/// Run the batched generation call: one output per prompt, prompt order.
/// Prompts decode sequentially, so at most one sequence is in flight at a
/// time.
fn run_batch(
    state: &mut InferenceState,
    prompts: &[AudioPrompt],
    sampling: &SamplingConfig,
) -> Result<Vec<GenerationOutput>, TranscribeError> {
    let mut outputs = Vec::with_capacity(prompts.len());
    for prompt in prompts {
        debug!(samples = prompt.samples.len(), "transcribing prompt");
        let output = transcribe_prompt(state, prompt, sampling)
            .map_err(|e| TranscribeError::Generation(e.to_string()))?;
        outputs.push(output);
    }
    Ok(outputs)
}

fn transcribe_prompt(
    state: &mut InferenceState,
    prompt: &AudioPrompt,
    sampling: &SamplingConfig,
) -> std::result::Result<GenerationOutput, Box<dyn std::error::Error + Send + Sync>> {
    let samples = resample_to_model_rate(&prompt.samples, prompt.sample_rate)?;
    let features = mel::log_mel_features(&samples);

    let features_tensor = ort::value::Tensor::from_array((
        vec![1i64, mel::N_MELS as i64, mel::N_FRAMES as i64],
        features,
    ))?;
    let encoder_outputs = state
        .encoder
        .run(ort::inputs!["input_features" => features_tensor])?;
    let (enc_shape, enc_data) = encoder_outputs[0].try_extract_tensor::<f32>()?;
    let enc_shape: Vec<i64> = enc_shape.to_vec();
    let enc_data: Vec<f32> = enc_data.to_vec();
    drop(encoder_outputs);

    // Greedy decode. The prompt contributes one fixed start token; output is
    // capped by both the sampling budget and the model's sequence length.
    let max_len = sampling.max_tokens.min(MAX_MODEL_LEN - 1);
    let mut tokens: Vec<i64> = vec![i64::from(state.start_token)];

    loop {
        let hidden = ort::value::Tensor::from_array((enc_shape.clone(), enc_data.clone()))?;
        let ids = ort::value::Tensor::from_array((
            vec![1i64, tokens.len() as i64],
            tokens.clone(),
        ))?;
        let decoder_outputs = state.decoder.run(ort::inputs![
            "input_ids" => ids,
            "encoder_hidden_states" => hidden
        ])?;
        let (logits_shape, logits) = decoder_outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = logits_shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 3 || dims[1] != tokens.len() {
            return Err(format!("unexpected logits shape: {logits_shape:?}").into());
        }
        let vocab = dims[2];
        let last = &logits[(tokens.len() - 1) * vocab..tokens.len() * vocab];
        let next = argmax(last);

        if next == i64::from(state.end_token) {
            break;
        }
        tokens.push(next);
        if tokens.len() - 1 >= max_len {
            break;
        }
    }

    let generated: Vec<u32> = tokens[1..].iter().map(|&t| t as u32).collect();
    let text = state
        .tokenizer
        .decode(&generated, true)
        .map_err(|e| format!("token decode: {e}"))?;
    Ok(GenerationOutput::text(text))
}

/// Index of the largest logit. Temperature 0 and full nucleus mass reduce
/// sampling to this.
fn argmax(logits: &[f32]) -> i64 {
    let mut best = 0usize;
    let mut best_val = f32::MIN;
    for (i, &v) in logits.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best = i;
        }
    }
    best as i64
}

/// Resample mono samples to the model's 16 kHz input rate.
fn resample_to_model_rate(
    samples: &[f32],
    sample_rate: u32,
) -> std::result::Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
    if sample_rate == mel::SAMPLE_RATE {
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
        WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = f64::from(mel::SAMPLE_RATE) / f64::from(sample_rate);
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)?;
    let mut out = resampler.process(&[samples.to_vec()], None)?;
    Ok(out.swap_remove(0))
}
