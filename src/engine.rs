//! Playback engine.
//!
//! Owns the hardware output connection and the single live playback session.
//! Elapsed time is reconciled across three clocks: a monotonic reference
//! captured when a session starts, the logical position accumulated across
//! pause/resume cycles, and a ~10 Hz polling thread that publishes
//! `current_time` for the UI.
//!
//! "Finished naturally" versus "explicitly stopped" is disambiguated with a
//! session generation counter: every transition that ends a session bumps the
//! counter, and the polling thread only treats a drained source as completion
//! while its own generation is still current.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::codec;

/// Cadence of the elapsed-time polling thread.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("malformed base64 audio payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("audio output device unavailable: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("audio playback error: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Playing,
    Paused,
}

/// Session state shared between the engine and its polling thread.
struct Inner {
    state: State,
    /// Bumped by every transition that ends a session. A polling thread whose
    /// captured generation no longer matches must exit without touching state.
    generation: u64,
    /// The one live hardware source. Stopped and dropped on every exit path.
    sink: Option<Arc<Sink>>,
    /// Monotonic reference for the current Playing stretch.
    started: Option<Instant>,
    /// Logical position at which the current stretch began; doubles as the
    /// paused offset while in Paused.
    base_offset: Duration,
    current_time: f64,
    duration: f64,
}

impl Inner {
    fn elapsed(&self) -> Duration {
        self.base_offset + self.started.map(|t| t.elapsed()).unwrap_or_default()
    }
}

/// Halt the live source and fully reset to Idle.
///
/// Used by explicit stop, natural completion, and error recovery; idempotent.
fn reset_to_idle(inner: &mut Inner) {
    inner.generation += 1;
    if let Some(sink) = inner.sink.take() {
        sink.stop();
    }
    inner.state = State::Idle;
    inner.started = None;
    inner.base_offset = Duration::ZERO;
    inner.current_time = 0.0;
}

/// Halt the live source, recording the paused offset for a later resume.
fn pause_session(inner: &mut Inner) {
    inner.generation += 1;
    if let Some(sink) = inner.sink.take() {
        sink.stop();
    }
    let elapsed = inner.elapsed();
    inner.started = None;
    inner.base_offset = elapsed;
    inner.current_time = elapsed.as_secs_f64().clamp(0.0, inner.duration);
    inner.state = State::Paused;
    log::debug!("playback paused at {:.2}s", inner.current_time);
}

/// Plays one decoded payload at a time through the default output device.
///
/// The device is acquired once at construction and held for the lifetime of
/// the engine; at most one source is ever connected to it. All methods are
/// called from the UI side; the only background activity is a per-session
/// polling thread that exits within one poll interval of its session ending.
pub struct PlaybackEngine {
    // Keeps the output device open. Dropping it would silence the sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    inner: Arc<Mutex<Inner>>,
}

impl PlaybackEngine {
    /// Open the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            inner: Arc::new(Mutex::new(Inner {
                state: State::Idle,
                generation: 0,
                sink: None,
                started: None,
                base_offset: Duration::ZERO,
                current_time: 0.0,
                duration: 0.0,
            })),
        })
    }

    /// Start, resume, or pause playback of the given payload.
    ///
    /// Called while `Playing`, this pauses (the UI's play button is a
    /// toggle). Called while `Idle` or `Paused`, it decodes the payload,
    /// primes a fresh source at the paused offset (0 from `Idle`) and starts
    /// it at `speed` — a playback-rate scalar, so pitch shifts with speed.
    ///
    /// Decode and device failures leave the engine `Idle` and are returned
    /// to the caller.
    pub fn play(&mut self, encoded: &str, speed: f32) -> Result<(), AudioError> {
        {
            let mut inner = self.inner.lock();
            if inner.state == State::Playing {
                pause_session(&mut inner);
                return Ok(());
            }
        }

        match self.start_session(encoded, speed) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("playback failed: {err}");
                self.stop();
                Err(err)
            }
        }
    }

    fn start_session(&mut self, encoded: &str, speed: f32) -> Result<(), AudioError> {
        let expected_generation = self.inner.lock().generation;

        // Decode outside the lock. If a stop lands meanwhile it bumps the
        // generation and the finished decode is discarded below.
        let bytes = codec::decode_base64(encoded)?;
        let buffer = codec::pcm_to_buffer(&bytes, codec::SAMPLE_RATE, codec::NUM_CHANNELS);
        let duration = buffer.duration_secs();

        let sink = Sink::try_new(&self.handle)?;

        let mut inner = self.inner.lock();
        if inner.generation != expected_generation {
            log::debug!("discarding stale decode; session was stopped during setup");
            sink.stop();
            return Ok(());
        }

        // Only one source may ever be connected to the device.
        if let Some(old) = inner.sink.take() {
            old.stop();
        }

        let offset = match inner.state {
            State::Paused => inner.base_offset,
            _ => Duration::ZERO,
        };
        let source = SamplesBuffer::new(buffer.channels, buffer.sample_rate, buffer.samples)
            .skip_duration(offset);
        sink.set_speed(speed);
        sink.append(source);

        inner.generation += 1;
        let generation = inner.generation;
        inner.sink = Some(Arc::new(sink));
        inner.state = State::Playing;
        inner.started = Some(Instant::now());
        inner.base_offset = offset;
        inner.duration = duration;
        inner.current_time = offset.as_secs_f64().clamp(0.0, duration);
        drop(inner);

        log::info!(
            "playback session started: {duration:.2}s at x{speed} (offset {:.2}s)",
            offset.as_secs_f64()
        );
        self.spawn_poll(generation, duration);
        Ok(())
    }

    /// Publish `current_time` at ~10 Hz and watch for natural completion.
    fn spawn_poll(&self, generation: u64, duration: f64) {
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || loop {
            thread::sleep(POLL_INTERVAL);

            let mut inner = inner.lock();
            if inner.generation != generation {
                return;
            }

            inner.current_time = inner.elapsed().as_secs_f64().clamp(0.0, duration);

            let drained = inner.sink.as_ref().map_or(true, |sink| sink.empty());
            if drained {
                // End of buffer for this exact session, not a racing stop.
                log::debug!("playback finished after {:.2}s", inner.current_time);
                reset_to_idle(&mut inner);
                return;
            }
        });
    }

    /// Halt playback and reset to `Idle`. Safe to call from any state,
    /// including `Idle`, and calling it twice is the same as calling it once.
    pub fn stop(&mut self) {
        let mut inner = self.inner.lock();
        reset_to_idle(&mut inner);
    }

    /// True iff a session with an active hardware source exists.
    pub fn is_playing(&self) -> bool {
        self.inner.lock().state == State::Playing
    }

    /// Elapsed playback time in seconds, clamped to `[0, duration]`.
    pub fn current_time(&self) -> f64 {
        self.inner.lock().current_time
    }

    /// Duration in seconds of the most recently played buffer.
    pub fn duration(&self) -> f64 {
        self.inner.lock().duration
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        // Cancels the polling thread and releases the source before the
        // output stream goes away.
        self.stop();
    }
}
