//! Transport facade.
//!
//! The single object the UI holds. Owns the current encoded payload and the
//! playback engine, and exposes the play/stop/download surface plus polled
//! state accessors.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::codec;
use crate::engine::{AudioError, PlaybackEngine};

/// Default filename for downloaded audio.
pub const DOWNLOAD_FILENAME: &str = "voicecraft_output.wav";

/// Snapshot of the playback state, recomputed on each call for the UI's
/// polling cadence. Serializes with the field names the UI expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
}

/// Playback transport for one synthesis result.
///
/// Holds at most one encoded payload at a time; a new generation request
/// replaces it wholesale via [`set_audio`](Self::set_audio). The payload is
/// decoded afresh on every play and download, never cached in decoded form.
pub struct AudioTransport {
    engine: PlaybackEngine,
    audio: Option<String>,
}

impl AudioTransport {
    /// Create a transport bound to the default output device.
    pub fn new() -> Result<Self, AudioError> {
        Ok(Self {
            engine: PlaybackEngine::new()?,
            audio: None,
        })
    }

    /// Replace the current payload. Any live playback session refers to the
    /// payload being replaced, so it is stopped first.
    pub fn set_audio(&mut self, encoded: Option<String>) {
        self.engine.stop();
        self.audio = encoded;
    }

    /// The current encoded payload, if any.
    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    /// Start, resume, or pause playback (see [`PlaybackEngine::play`]).
    /// A no-op when no payload is set.
    pub fn play(&mut self, speed: f32) -> Result<(), AudioError> {
        let Some(encoded) = self.audio.as_deref() else {
            return Ok(());
        };
        self.engine.play(encoded, speed)
    }

    /// Halt playback and reset elapsed time. Safe from any state.
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Write the payload as a WAV file under the default filename in the
    /// current directory. Independent of playback state; a no-op when no
    /// payload is set.
    pub fn download(&self) -> Result<(), AudioError> {
        self.download_to(Path::new(DOWNLOAD_FILENAME))
    }

    /// Write the payload as a WAV file to the given path.
    pub fn download_to(&self, path: &Path) -> Result<(), AudioError> {
        let Some(encoded) = self.audio.as_deref() else {
            return Ok(());
        };

        let pcm = codec::decode_base64(encoded)?;
        let file = codec::wav_file_bytes(
            &pcm,
            codec::SAMPLE_RATE,
            codec::NUM_CHANNELS,
            codec::BITS_PER_SAMPLE,
        );
        fs::write(path, &file)?;
        log::info!("wrote {} byte WAV to {}", file.len(), path.display());
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn current_time(&self) -> f64 {
        self.engine.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.engine.duration()
    }

    /// Current state snapshot for the UI.
    pub fn state(&self) -> TransportState {
        TransportState {
            is_playing: self.engine.is_playing(),
            current_time: self.engine.current_time(),
            duration: self.engine.duration(),
        }
    }
}
