//! Shared test fixtures for transcription tests.
//!
//! Provides an in-memory WAV builder — previously copy-pasted across test
//! modules here and in the server integration tests.

/// Encode mono f32 samples as a 16-bit PCM WAV byte buffer.
///
/// Minimal canonical RIFF layout: `RIFF` header, `fmt ` chunk, `data` chunk.
/// Good enough for symphonia's wav reader; not a general-purpose encoder.
pub fn wav_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + samples.len() * 2);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // PCM fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // format: PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // channels: mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// A silent mono WAV of `secs` seconds at `sample_rate`.
pub fn silent_wav(secs: u32, sample_rate: u32) -> Vec<u8> {
    wav_bytes(&vec![0.0; (secs * sample_rate) as usize], sample_rate)
}
