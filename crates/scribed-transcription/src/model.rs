//! Model file management — download from `HuggingFace` and path resolution.

use std::path::{Path, PathBuf};

#[cfg(feature = "ort")]
use scribed_core::TranscribeError;
#[cfg(feature = "ort")]
use tracing::{debug, info, warn};

/// `HuggingFace` repository holding the ONNX export of
/// `openai/whisper-large-v3-turbo`.
#[cfg(feature = "ort")]
const HF_REPO: &str = "onnx-community/whisper-large-v3-turbo";

/// Typed paths for the 3 required model files.
pub struct ModelPaths {
    /// Audio encoder (`encoder_model.onnx`).
    pub encoder: PathBuf,
    /// Text decoder without KV cache (`decoder_model.onnx`).
    pub decoder: PathBuf,
    /// Tokenizer definition (`tokenizer.json`).
    pub tokenizer: PathBuf,
}

impl ModelPaths {
    /// Required files as (repo path, local filename) pairs. The ONNX graphs
    /// live under the repo's `onnx/` folder but are cached flat locally.
    pub const FILES: &[(&str, &str)] = &[
        ("onnx/encoder_model.onnx", "encoder_model.onnx"),
        ("onnx/decoder_model.onnx", "decoder_model.onnx"),
        ("tokenizer.json", "tokenizer.json"),
    ];

    /// Construct paths for all model files under `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            encoder: dir.join("encoder_model.onnx"),
            decoder: dir.join("decoder_model.onnx"),
            tokenizer: dir.join("tokenizer.json"),
        }
    }

    /// Check if all required files exist.
    pub fn all_exist(&self) -> bool {
        self.encoder.exists() && self.decoder.exists() && self.tokenizer.exists()
    }
}

/// Default model cache directory under `~/.scribed/models/onnx/`.
pub fn default_model_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(format!("{home}/.scribed/models/onnx"))
}

/// Check if all required model files exist locally.
pub fn is_model_cached(model_dir: impl AsRef<Path>) -> bool {
    ModelPaths::from_dir(model_dir).all_exist()
}

/// Download model files from `HuggingFace` if not already cached.
///
/// Files land in `HuggingFace`'s cache, then are copied into `model_dir`.
#[cfg(feature = "ort")]
pub async fn ensure_model(model_dir: impl AsRef<Path>) -> Result<(), TranscribeError> {
    let model_dir = model_dir.as_ref().to_path_buf();

    if is_model_cached(&model_dir) {
        debug!("model files already cached at {}", model_dir.display());
        return Ok(());
    }

    info!("downloading whisper-large-v3-turbo ONNX export from HuggingFace...");
    std::fs::create_dir_all(&model_dir)
        .map_err(|e| TranscribeError::Generation(format!("create model dir: {e}")))?;

    // Run download on a blocking thread (hf-hub uses sync HTTP).
    let dir = model_dir.clone();
    tokio::task::spawn_blocking(move || download_model_files(&dir))
        .await
        .map_err(|e| TranscribeError::Generation(format!("download task join: {e}")))?
}

#[cfg(feature = "ort")]
fn download_model_files(model_dir: &Path) -> Result<(), TranscribeError> {
    let api = hf_hub::api::sync::Api::new()
        .map_err(|e| TranscribeError::Generation(format!("HF API init: {e}")))?;
    let repo = api.model(HF_REPO.to_string());

    for &(remote, local) in ModelPaths::FILES {
        let target = model_dir.join(local);
        if target.exists() {
            debug!("skipping {local} (already exists)");
            continue;
        }

        info!("downloading {remote}...");
        match repo.get(remote) {
            Ok(cached_path) => {
                if cached_path != target {
                    let _ = std::fs::copy(&cached_path, &target).map_err(|e| {
                        TranscribeError::Generation(format!("copy {local}: {e}"))
                    })?;
                }
                debug!("downloaded {local}");
            }
            Err(e) => {
                warn!("failed to download {remote}: {e}");
                return Err(TranscribeError::Generation(format!(
                    "download failed for {remote}: {e}"
                )));
            }
        }
    }

    info!("all model files ready at {}", model_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_from_dir_constructs_all_paths() {
        let paths = ModelPaths::from_dir("/tmp/test");
        assert_eq!(paths.encoder, PathBuf::from("/tmp/test/encoder_model.onnx"));
        assert_eq!(paths.decoder, PathBuf::from("/tmp/test/decoder_model.onnx"));
        assert_eq!(paths.tokenizer, PathBuf::from("/tmp/test/tokenizer.json"));
    }

    #[test]
    fn model_paths_all_exist_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!ModelPaths::from_dir(tmp.path()).all_exist());
    }

    #[test]
    fn model_paths_all_exist_partial() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("encoder_model.onnx"), b"").unwrap();
        assert!(!ModelPaths::from_dir(tmp.path()).all_exist());
    }

    #[test]
    fn model_paths_all_exist_complete() {
        let tmp = tempfile::tempdir().unwrap();
        for &(_, local) in ModelPaths::FILES {
            std::fs::write(tmp.path().join(local), b"").unwrap();
        }
        assert!(ModelPaths::from_dir(tmp.path()).all_exist());
    }

    #[test]
    fn default_model_dir_under_scribed() {
        let dir = default_model_dir();
        let s = dir.to_string_lossy();
        assert!(s.contains(".scribed/models/onnx"), "Got: {s}");
    }

    #[test]
    fn is_model_cached_false_for_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!is_model_cached(tmp.path()));
    }
}
