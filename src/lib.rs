//! # voicecraft-audio
//!
//! Audio playback and WAV export for the VoiceCraft speech app.
//!
//! The speech generation service returns one synthesis result as a
//! base64-encoded string of mono 16-bit little-endian PCM at 24000 Hz.
//! This crate is everything the UI needs to do with that payload:
//!
//! - **Codec**: base64 → raw PCM bytes → normalized playable samples, and a
//!   hand-rolled RIFF/WAVE wrapper for lossless download
//! - **Playback engine**: owns the output device, tracks play/pause state and
//!   elapsed time across pause/resume cycles, applies a speed multiplier
//! - **Transport facade**: the single object the UI holds
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! voicecraft-audio = "0.1"
//! ```
//!
//! ```no_run
//! use voicecraft_audio::AudioTransport;
//!
//! # let payload_from_service = String::new();
//! let mut transport = AudioTransport::new()?;
//! transport.set_audio(Some(payload_from_service));
//!
//! transport.play(1.0)?;           // start playback
//! transport.play(1.0)?;           // a second call pauses
//! transport.play(1.5)?;           // resume, faster
//! println!("{:.1}s / {:.1}s", transport.current_time(), transport.duration());
//!
//! transport.download()?;          // writes voicecraft_output.wav
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod engine;
pub mod transport;

pub use codec::{decode_base64, pcm_to_buffer, wav_file_bytes};
pub use codec::{BITS_PER_SAMPLE, NUM_CHANNELS, SAMPLE_RATE};
pub use engine::{AudioError, PlaybackEngine};
pub use transport::{AudioTransport, TransportState, DOWNLOAD_FILENAME};

/// Decoded PCM audio, ready for playback.
///
/// Contains interleaved f32 samples normalized to the range [-1.0, 1.0).
/// Derived deterministically from the encoded payload and recomputed on each
/// play or download request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Interleaved normalized samples
    pub samples: Vec<f32>,
    /// Sample rate of the audio (24000 for the generation service)
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
}

impl PcmBuffer {
    /// Number of complete frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}
