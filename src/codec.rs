//! Binary codec for synthesized speech payloads.
//!
//! Pure functions converting base64 text ↔ raw PCM bytes, raw PCM ↔ a
//! playable sample buffer, and raw PCM ↔ a self-contained RIFF/WAVE file.
//! The WAV header is written by hand so the download is a bit-exact wrap of
//! the payload with no transcoding in between.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::engine::AudioError;
use crate::PcmBuffer;

/// Sample rate of payloads from the generation service.
pub const SAMPLE_RATE: u32 = 24000;

/// Payloads are mono.
pub const NUM_CHANNELS: u16 = 1;

/// Payload samples are signed 16-bit little-endian.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Size of the canonical RIFF/WAVE header.
const WAV_HEADER_LEN: usize = 44;

/// Decode a base64 payload (standard alphabet, padded) into raw bytes.
///
/// Malformed input — invalid characters or a length inconsistent with
/// padding — fails with [`AudioError::Decode`]; callers must not assume
/// success.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, AudioError> {
    Ok(STANDARD.decode(text)?)
}

/// Reinterpret raw PCM bytes as a playable buffer.
///
/// Bytes are read as little-endian signed 16-bit samples and normalized to
/// [-1.0, 1.0) by dividing by 32768. The frame count is
/// `floor(len / 2 / channels)`; any trailing bytes that do not form a
/// complete frame are dropped silently rather than reported as an error.
pub fn pcm_to_buffer(bytes: &[u8], sample_rate: u32, channels: u16) -> PcmBuffer {
    let channels = channels.max(1);
    let bytes_per_frame = 2 * usize::from(channels);
    let frames = bytes.len() / bytes_per_frame;

    let mut samples = Vec::with_capacity(frames * usize::from(channels));
    for pair in bytes[..frames * bytes_per_frame].chunks_exact(2) {
        let value = i16::from_le_bytes([pair[0], pair[1]]);
        samples.push(f32::from(value) / 32768.0);
    }

    PcmBuffer {
        samples,
        sample_rate,
        channels,
    }
}

/// Wrap raw PCM bytes in a canonical 44-byte RIFF/WAVE header.
///
/// The payload bytes are appended unchanged after the header; all multi-byte
/// header fields are little-endian. This performs no resampling or
/// transcoding.
pub fn wav_file_bytes(
    pcm: &[u8],
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
) -> Vec<u8> {
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = pcm.len() as u32;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt sub-chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // format tag: linear PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_standard_base64() {
        let bytes = decode_base64("AAEC/w==").expect("valid base64 should decode");
        assert_eq!(bytes, vec![0x00, 0x01, 0x02, 0xff]);
    }

    #[test]
    fn rejects_invalid_characters() {
        let err = decode_base64("not base64!").unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn rejects_padding_inconsistent_length() {
        let err = decode_base64("AAA").unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn mono_buffer_has_one_frame_per_two_bytes() {
        let buffer = pcm_to_buffer(&vec![0u8; 48000], SAMPLE_RATE, NUM_CHANNELS);
        assert_eq!(buffer.frames(), 24000);
        assert!((buffer.duration_secs() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trailing_partial_sample_is_dropped() {
        let buffer = pcm_to_buffer(&[0, 0, 0, 0, 7], SAMPLE_RATE, 1);
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.samples.len(), 2);
    }

    #[test]
    fn trailing_partial_frame_is_dropped_for_stereo() {
        // 6 bytes is one complete stereo frame plus one orphan sample.
        let buffer = pcm_to_buffer(&[0, 0, 0, 0, 0, 0], SAMPLE_RATE, 2);
        assert_eq!(buffer.frames(), 1);
        assert_eq!(buffer.samples.len(), 2);

        let buffer = pcm_to_buffer(&[0u8; 7], SAMPLE_RATE, 2);
        assert_eq!(buffer.frames(), 1);
        assert_eq!(buffer.samples.len(), 2);
    }

    #[test]
    fn normalizes_samples_into_unit_range() {
        let mut pcm = Vec::new();
        for value in [i16::MIN, 0, 16384, i16::MAX] {
            pcm.extend_from_slice(&value.to_le_bytes());
        }

        let buffer = pcm_to_buffer(&pcm, SAMPLE_RATE, 1);
        assert_eq!(buffer.samples, vec![-1.0, 0.0, 0.5, 32767.0 / 32768.0]);
    }

    #[test]
    fn wav_header_fields_are_exact() {
        let pcm = [1u8, 2, 3, 4, 5, 6];
        let file = wav_file_bytes(&pcm, SAMPLE_RATE, NUM_CHANNELS, BITS_PER_SAMPLE);

        assert_eq!(file.len(), 44 + pcm.len());
        assert_eq!(&file[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(file[4..8].try_into().unwrap()), 36 + 6);
        assert_eq!(&file[8..12], b"WAVE");
        assert_eq!(&file[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(file[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes(file[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(file[22..24].try_into().unwrap()), 1);
        assert_eq!(
            u32::from_le_bytes(file[24..28].try_into().unwrap()),
            24000
        );
        // byte rate = 24000 * 1 * 16/8
        assert_eq!(
            u32::from_le_bytes(file[28..32].try_into().unwrap()),
            48000
        );
        assert_eq!(u16::from_le_bytes(file[32..34].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(file[34..36].try_into().unwrap()), 16);
        assert_eq!(&file[36..40], b"data");
        assert_eq!(u32::from_le_bytes(file[40..44].try_into().unwrap()), 6);
        assert_eq!(&file[44..], &pcm);
    }

    #[test]
    fn wav_round_trip_recovers_format_and_payload() {
        let mut pcm = Vec::new();
        for value in [-32768i16, -1, 0, 1, 12345, 32767] {
            pcm.extend_from_slice(&value.to_le_bytes());
        }

        let file = wav_file_bytes(&pcm, SAMPLE_RATE, NUM_CHANNELS, BITS_PER_SAMPLE);
        let mut reader =
            hound::WavReader::new(Cursor::new(file)).expect("header should parse as WAV");

        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len(), 6);

        let samples: Vec<i16> = reader
            .samples::<i16>()
            .map(|s| s.expect("payload samples should read back"))
            .collect();
        assert_eq!(samples, vec![-32768, -1, 0, 1, 12345, 32767]);
    }
}
