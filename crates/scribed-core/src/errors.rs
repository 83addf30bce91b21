//! The closed failure enumeration for the transcription path.
//!
//! Every failure between "bytes arrived" and "JSON left" is one of three
//! kinds. Only the HTTP boundary in `scribed-server` translates these into
//! status codes (400 for [`TranscribeError::EmptyInput`], 500 for the rest);
//! nothing below that layer knows about HTTP.

/// Errors that can occur while turning audio bytes into a transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    /// The request carried no body at all. The pipeline is never invoked.
    #[error("Empty request body")]
    EmptyInput,

    /// Audio decoding failure (unsupported format, corrupt data).
    #[error("audio decode failed: {0}")]
    Decode(String),

    /// Generation failure anywhere in the engine call or result assembly.
    #[error("generation failed: {0}")]
    Generation(String),
}

impl TranscribeError {
    /// Whether this error is the caller's fault (missing input) rather
    /// than an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }
}

/// Extension trait to reduce `.map_err()` boilerplate when wrapping errors
/// into [`TranscribeError`].
pub trait ResultExt<T> {
    /// Wrap the error as [`TranscribeError::Decode`] with `context` prefix.
    fn decode(self, context: &str) -> Result<T, TranscribeError>;
    /// Wrap the error as [`TranscribeError::Generation`] with `context` prefix.
    fn generation(self, context: &str) -> Result<T, TranscribeError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn decode(self, context: &str) -> Result<T, TranscribeError> {
        self.map_err(|e| TranscribeError::Decode(format!("{context}: {e}")))
    }
    fn generation(self, context: &str) -> Result<T, TranscribeError> {
        self.map_err(|e| TranscribeError::Generation(format!("{context}: {e}")))
    }
}
