//! Log-mel feature extraction for the whisper encoder.
//!
//! Whisper's frontend: 16 kHz mono input padded to the 30 s receptive field,
//! STFT with a 400-point periodic Hann window and hop 160, 128 triangular
//! mel filters (HTK-style break at 1 kHz), log10 power clamped to
//! `max - 8.0` then scaled by `(x + 4) / 4`.

use std::sync::OnceLock;

/// Input sample rate expected by the model.
pub const SAMPLE_RATE: u32 = 16_000;
/// STFT size.
const N_FFT: usize = 400;
/// Hop between frames.
const HOP_LENGTH: usize = 160;
/// Positive-frequency bins.
const N_FREQ: usize = N_FFT / 2 + 1; // 201
/// Mel bins for large-v3 family models.
pub const N_MELS: usize = 128;
/// Samples in one 30 s receptive field.
pub const CHUNK_SAMPLES: usize = 30 * SAMPLE_RATE as usize; // 480_000
/// Frames produced per receptive field.
pub const N_FRAMES: usize = CHUNK_SAMPLES / HOP_LENGTH; // 3_000

fn hertz_to_mel(freq: f32) -> f32 {
    let min_log_hertz = 1000.0f32;
    let min_log_mel = 15.0f32;
    let logstep = 27.0 / (6.4f32).ln();
    if freq >= min_log_hertz {
        min_log_mel + (freq / min_log_hertz).ln() * logstep
    } else {
        3.0 * freq / 200.0
    }
}

fn mel_to_hertz(mels: f32) -> f32 {
    let min_log_hertz = 1000.0f32;
    let min_log_mel = 15.0f32;
    let logstep = (6.4f32).ln() / 27.0;
    if mels >= min_log_mel {
        min_log_hertz * (logstep * (mels - min_log_mel)).exp()
    } else {
        200.0 * mels / 3.0
    }
}

/// Slaney-normalized triangular filterbank, flattened `[N_MELS, N_FREQ]`.
fn build_mel_filterbank() -> Vec<f32> {
    let mut fft_freqs = vec![0.0f32; N_FREQ];
    for (i, f) in fft_freqs.iter_mut().enumerate() {
        *f = i as f32 * (SAMPLE_RATE as f32 / 2.0) / (N_FREQ - 1) as f32;
    }

    let mel_min = hertz_to_mel(0.0);
    let mel_max = hertz_to_mel(SAMPLE_RATE as f32 / 2.0);

    let mut edges = vec![0.0f32; N_MELS + 2];
    for (i, e) in edges.iter_mut().enumerate() {
        let mel = mel_min + (mel_max - mel_min) * i as f32 / (N_MELS + 1) as f32;
        *e = mel_to_hertz(mel);
    }
    let mut widths = vec![0.0f32; N_MELS + 1];
    for (i, w) in widths.iter_mut().enumerate() {
        *w = (edges[i + 1] - edges[i]).max(1e-6);
    }

    let mut filters = vec![0.0f32; N_MELS * N_FREQ];
    for m in 0..N_MELS {
        let enorm = 2.0 / (edges[m + 2] - edges[m]);
        for k in 0..N_FREQ {
            let rising = (fft_freqs[k] - edges[m]) / widths[m];
            let falling = (edges[m + 2] - fft_freqs[k]) / widths[m + 1];
            filters[m * N_FREQ + k] = rising.min(falling).max(0.0) * enorm;
        }
    }
    filters
}

/// Compute whisper log-mel features for one receptive field.
///
/// `samples` must already be 16 kHz mono; it is zero-padded or truncated to
/// exactly [`CHUNK_SAMPLES`]. Returns `[N_MELS, N_FRAMES]` flattened
/// row-major, ready for the encoder's `input_features` tensor.
pub fn log_mel_features(samples: &[f32]) -> Vec<f32> {
    let mut padded = vec![0.0f32; CHUNK_SAMPLES + N_FFT];
    let copy_len = samples.len().min(CHUNK_SAMPLES);
    // Reflect-pad N_FFT/2 samples on each side, whisper's centered STFT.
    let half = N_FFT / 2;
    padded[half..half + copy_len].copy_from_slice(&samples[..copy_len]);
    for i in 0..half {
        let src = half - i;
        padded[i] = if src < copy_len { samples[src] } else { 0.0 };
    }

    static HANN: OnceLock<Vec<f32>> = OnceLock::new();
    let window = HANN.get_or_init(|| {
        (0..N_FFT)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / N_FFT as f32).cos()))
            .collect()
    });

    static FILTERS: OnceLock<Vec<f32>> = OnceLock::new();
    let filters = FILTERS.get_or_init(build_mel_filterbank);

    static DFT: OnceLock<(Vec<f32>, Vec<f32>)> = OnceLock::new();
    let (dft_cos, dft_sin) = DFT.get_or_init(|| {
        let mut cos_tbl = vec![0.0f32; N_FREQ * N_FFT];
        let mut sin_tbl = vec![0.0f32; N_FREQ * N_FFT];
        for k in 0..N_FREQ {
            for n in 0..N_FFT {
                let angle = std::f32::consts::TAU * (k * n) as f32 / N_FFT as f32;
                cos_tbl[k * N_FFT + n] = angle.cos();
                sin_tbl[k * N_FFT + n] = angle.sin();
            }
        }
        (cos_tbl, sin_tbl)
    });

    let mut mel = vec![0.0f32; N_MELS * N_FRAMES];
    let mut windowed = vec![0.0f32; N_FFT];
    let mut power = vec![0.0f32; N_FREQ];
    let mut global_max = f32::MIN;

    for t in 0..N_FRAMES {
        let start = t * HOP_LENGTH;
        for i in 0..N_FFT {
            windowed[i] = padded[start + i] * window[i];
        }
        for k in 0..N_FREQ {
            let cos_row = &dft_cos[k * N_FFT..(k + 1) * N_FFT];
            let sin_row = &dft_sin[k * N_FFT..(k + 1) * N_FFT];
            let mut re = 0.0f32;
            let mut im = 0.0f32;
            for n in 0..N_FFT {
                re += windowed[n] * cos_row[n];
                im += windowed[n] * sin_row[n];
            }
            power[k] = re * re + im * im;
        }
        for m in 0..N_MELS {
            let row = &filters[m * N_FREQ..(m + 1) * N_FREQ];
            let sum: f32 = row.iter().zip(&power).map(|(f, p)| f * p).sum();
            let val = sum.max(1e-10).log10();
            mel[m * N_FRAMES + t] = val;
            global_max = global_max.max(val);
        }
    }

    let floor = global_max - 8.0;
    for v in &mut mel {
        *v = (v.max(floor) + 4.0) / 4.0;
    }
    mel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_shape_is_fixed() {
        let mel = log_mel_features(&vec![0.0; SAMPLE_RATE as usize]);
        assert_eq!(mel.len(), N_MELS * N_FRAMES);
    }

    #[test]
    fn silence_normalizes_to_finite_range() {
        let mel = log_mel_features(&vec![0.0; CHUNK_SAMPLES]);
        assert!(mel.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn tone_concentrates_energy_off_silence_floor() {
        let tone: Vec<f32> = (0..CHUNK_SAMPLES)
            .map(|i| (std::f32::consts::TAU * 440.0 * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();
        let mel = log_mel_features(&tone);
        let max = mel.iter().copied().fold(f32::MIN, f32::max);
        let min = mel.iter().copied().fold(f32::MAX, f32::min);
        // Clamp window is 8 log10 units wide, scaled by /4.
        assert!((max - min) <= 2.0 + 1e-4);
        assert!(max > min);
    }

    #[test]
    fn filterbank_rows_are_nonnegative_and_local() {
        let filters = build_mel_filterbank();
        assert_eq!(filters.len(), N_MELS * N_FREQ);
        assert!(filters.iter().all(|&v| v >= 0.0));
        // Each row has some passband.
        for m in 0..N_MELS {
            let row = &filters[m * N_FREQ..(m + 1) * N_FREQ];
            assert!(row.iter().any(|&v| v > 0.0), "empty filter row {m}");
        }
    }
}
