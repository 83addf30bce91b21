//! Fixed-duration chunk windowing over decoded samples.
//!
//! Chunks partition the sample array exactly: no overlap, no gap, order
//! preserved. The last chunk holds whatever samples remain and is never
//! padded; padding to the model's receptive field is the engine's business.

use scribed_core::constants::CHUNK_DURATION_SECS;

/// Samples per full chunk at the given sample rate.
pub fn samples_per_chunk(sample_rate: u32) -> usize {
    CHUNK_DURATION_SECS as usize * sample_rate as usize
}

/// `ceil(total_samples / samples_per_chunk)`.
pub fn chunk_count(total_samples: usize, samples_per_chunk: usize) -> usize {
    total_samples.div_ceil(samples_per_chunk)
}

/// Split `samples` into sequential fixed-duration windows.
///
/// Returns borrowed slices; callers that need owned chunk payloads copy at
/// prompt-construction time.
pub fn split_chunks(samples: &[f32], sample_rate: u32) -> Vec<&[f32]> {
    if samples.is_empty() {
        return Vec::new();
    }
    samples.chunks(samples_per_chunk(sample_rate)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_per_chunk_at_16k() {
        assert_eq!(samples_per_chunk(16_000), 480_000);
    }

    #[test]
    fn exact_multiple_gives_equal_chunks() {
        let samples = vec![0.0f32; 960_000]; // exactly 60s at 16kHz
        let chunks = split_chunks(&samples, 16_000);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 480_000));
    }

    #[test]
    fn sixty_five_seconds_at_16k_gives_three_chunks() {
        let samples = vec![0.0f32; 65 * 16_000];
        let chunks = split_chunks(&samples, 16_000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 480_000);
        assert_eq!(chunks[1].len(), 480_000);
        assert_eq!(chunks[2].len(), 80_000);
    }

    #[test]
    fn short_audio_is_one_truncated_chunk() {
        let samples = vec![0.0f32; 1_000];
        let chunks = split_chunks(&samples, 16_000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1_000);
    }

    #[test]
    fn empty_samples_give_no_chunks() {
        assert!(split_chunks(&[], 16_000).is_empty());
        assert_eq!(chunk_count(0, 480_000), 0);
    }

    #[test]
    fn chunk_count_matches_ceil() {
        assert_eq!(chunk_count(480_000, 480_000), 1);
        assert_eq!(chunk_count(480_001, 480_000), 2);
        assert_eq!(chunk_count(1, 480_000), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Chunks partition the input exactly: concatenation restores it.
            #[test]
            fn chunks_partition_input(
                len in 0usize..200_000,
                sample_rate in prop::sample::select(vec![8_000u32, 16_000, 22_050, 44_100])
            ) {
                let samples: Vec<f32> = (0..len).map(|i| i as f32).collect();
                let chunks = split_chunks(&samples, sample_rate);

                let total: usize = chunks.iter().map(|c| c.len()).sum();
                prop_assert_eq!(total, samples.len());

                let rejoined: Vec<f32> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
                prop_assert_eq!(rejoined, samples);
            }

            // All chunks but the last are full-length; the last is 1..=full.
            #[test]
            fn only_last_chunk_may_be_short(
                len in 1usize..200_000,
                sample_rate in prop::sample::select(vec![8_000u32, 16_000, 44_100])
            ) {
                let samples = vec![0.0f32; len];
                let chunks = split_chunks(&samples, sample_rate);
                let full = samples_per_chunk(sample_rate);

                prop_assert_eq!(chunks.len(), chunk_count(len, full));
                for c in &chunks[..chunks.len() - 1] {
                    prop_assert_eq!(c.len(), full);
                }
                let last = chunks[chunks.len() - 1];
                prop_assert!(last.len() >= 1 && last.len() <= full);
            }
        }
    }
}
