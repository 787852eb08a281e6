use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use voicecraft_audio::{AudioTransport, DOWNLOAD_FILENAME, SAMPLE_RATE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Stand-in for a synthesis result: a two-second 440 Hz tone as mono
    // 16-bit little-endian PCM, base64-encoded the way the service sends it.
    let mut pcm = Vec::with_capacity(SAMPLE_RATE as usize * 4);
    for n in 0..SAMPLE_RATE * 2 {
        let t = n as f32 / SAMPLE_RATE as f32;
        let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 0.4 * 32767.0) as i16;
        pcm.extend_from_slice(&sample.to_le_bytes());
    }

    let mut transport = AudioTransport::new()?;
    transport.set_audio(Some(STANDARD.encode(&pcm)));

    transport.play(1.0)?;
    thread::sleep(Duration::from_millis(600));

    // A second play() pauses; a third resumes from the same position.
    transport.play(1.0)?;
    println!("paused at {:.1}s", transport.current_time());
    thread::sleep(Duration::from_millis(500));

    transport.play(1.5)?;
    while transport.is_playing() {
        println!(
            "{:.1}s / {:.1}s",
            transport.current_time(),
            transport.duration()
        );
        thread::sleep(Duration::from_millis(250));
    }

    transport.download()?;
    println!("Saved to {DOWNLOAD_FILENAME}");
    Ok(())
}
