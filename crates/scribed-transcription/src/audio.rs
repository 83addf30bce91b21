//! Audio decoding: container bytes → mono f32 samples + native sample rate.
//!
//! Symphonia probes the container, decodes the default audio track, and the
//! result is downmixed to mono. The native sample rate is preserved; the
//! engine resamples internally if its model needs a fixed rate.

use std::io::Cursor;

use scribed_core::{ResultExt, TranscribeError};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Decoded request-scoped audio buffer.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Native sample rate of the source stream.
    pub sample_rate: u32,
}

/// Decode an encoded audio byte buffer.
///
/// Accepts any container/codec enabled in the symphonia feature set (wav,
/// mp3, flac, ogg/vorbis, mp4/aac). No fallback format is attempted:
/// unsupported or corrupt input is a [`TranscribeError::Decode`]. A valid
/// stream carrying zero samples decodes to an empty buffer; the pipeline
/// turns that into an empty transcript rather than an error.
pub fn decode_audio_bytes(bytes: &[u8]) -> Result<DecodedAudio, TranscribeError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .decode("unsupported or corrupt audio container")?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TranscribeError::Decode("no decodable audio track".into()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .decode("no decoder for audio track")?;

    let mut samples = Vec::new();
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(TranscribeError::Decode(format!("packet read: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Recoverable frame corruption: skip the packet.
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(error = %e, "skipping corrupt packet");
                continue;
            }
            Err(e) => return Err(TranscribeError::Decode(format!("frame decode: {e}"))),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let channels = spec.channels.count();

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        if channels <= 1 {
            samples.extend_from_slice(buf.samples());
        } else {
            // Downmix interleaved frames to mono by averaging channels.
            for frame in buf.samples().chunks_exact(channels) {
                samples.push(frame.iter().sum::<f32>() / channels as f32);
            }
        }
    }

    if sample_rate == 0 {
        return Err(TranscribeError::Decode("no sample rate in audio stream".into()));
    }

    debug!(
        samples = samples.len(),
        sample_rate, "decoded audio stream"
    );
    Ok(DecodedAudio { samples, sample_rate })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::wav_bytes;

    #[test]
    fn decodes_mono_wav_at_native_rate() {
        let samples: Vec<f32> = (0..16_000)
            .map(|i| (i as f32 / 16_000.0 * 440.0 * std::f32::consts::TAU).sin() * 0.5)
            .collect();
        let bytes = wav_bytes(&samples, 16_000);

        let decoded = decode_audio_bytes(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, 16_000);
        assert_eq!(decoded.samples.len(), 16_000);
        // 16-bit quantization keeps values close to the source.
        assert!((decoded.samples[4_000] - samples[4_000]).abs() < 1e-3);
    }

    #[test]
    fn preserves_non_16k_native_rate() {
        let samples = vec![0.25f32; 8_000];
        let bytes = wav_bytes(&samples, 8_000);
        let decoded = decode_audio_bytes(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, 8_000);
        assert_eq!(decoded.samples.len(), 8_000);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let err = decode_audio_bytes(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, TranscribeError::Decode(_)));
    }

    #[test]
    fn empty_wav_data_chunk_decodes_to_zero_samples() {
        let bytes = wav_bytes(&[], 16_000);
        let decoded = decode_audio_bytes(&bytes).unwrap();
        assert!(decoded.samples.is_empty());
        assert_eq!(decoded.sample_rate, 16_000);
    }
}
