//! Record one utterance from the microphone.
//!
//! Blocking: call from `tokio::task::spawn_blocking`.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crate::config::AudioConfig;

use super::capture::{AudioChunk, CaptureError, Microphone};
use super::resample::to_whisper_input;
use super::vad::{Endpoint, EndpointDetector};

/// Longest gap between two callback buffers before the stream is considered
/// dead.
const CHUNK_TIMEOUT: Duration = Duration::from_secs(2);

/// 16 kHz mono recording plus the reason it stopped.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub samples: Vec<f32>,
    pub endpoint: Endpoint,
}

impl Utterance {
    /// `true` when the detector never heard a voice frame.
    pub fn is_silent(&self) -> bool {
        self.endpoint == Endpoint::NoSpeech
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / super::WHISPER_SAMPLE_RATE as f32
    }
}

/// Open the default microphone and record until the endpoint detector stops.
pub fn record_utterance(config: &AudioConfig) -> Result<Utterance, CaptureError> {
    let mic = Microphone::open_default()?;
    let (tx, rx) = mpsc::channel::<AudioChunk>();
    let _stream = mic.start(tx)?;
    log::info!("audio: recording started");

    let utterance = collect_utterance(&rx, config)?;
    log::info!(
        "audio: recording stopped ({:?}, {:.1}s)",
        utterance.endpoint,
        utterance.duration_secs()
    );
    Ok(utterance)
}

/// Drain `rx` until the detector reports an endpoint.
pub fn collect_utterance(
    rx: &Receiver<AudioChunk>,
    config: &AudioConfig,
) -> Result<Utterance, CaptureError> {
    let mut detector = EndpointDetector::new(config);
    let mut samples = Vec::new();

    loop {
        let chunk = rx
            .recv_timeout(CHUNK_TIMEOUT)
            .map_err(|_| CaptureError::Disconnected)?;
        let pcm = to_whisper_input(&chunk.samples, chunk.sample_rate, chunk.channels);
        let verdict = detector.push(&pcm);
        samples.extend_from_slice(&pcm);

        if verdict != Endpoint::Continue {
            return Ok(Utterance {
                samples,
                endpoint: verdict,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AudioConfig {
        AudioConfig {
            vad_threshold: 0.01,
            end_silence_ms: 300,
            no_speech_timeout_secs: 1.0,
            max_recording_secs: 5.0,
        }
    }

    fn chunk(value: f32, len: usize) -> AudioChunk {
        AudioChunk {
            samples: vec![value; len],
            sample_rate: 16_000,
            channels: 1,
        }
    }

    #[test]
    fn stops_after_trailing_silence() {
        let (tx, rx) = mpsc::channel();
        tx.send(chunk(0.4, 8_000)).unwrap();
        tx.send(chunk(0.0, 8_000)).unwrap();

        let utt = collect_utterance(&rx, &config()).unwrap();
        assert_eq!(utt.endpoint, Endpoint::SpeechEnded);
        assert!(!utt.is_silent());
        assert_eq!(utt.samples.len(), 16_000);
    }

    #[test]
    fn silence_reports_no_speech() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            tx.send(chunk(0.0, 8_000)).unwrap();
        }
        let utt = collect_utterance(&rx, &config()).unwrap();
        assert!(utt.is_silent());
    }

    #[test]
    fn stereo_48k_chunks_are_converted() {
        let (tx, rx) = mpsc::channel();
        tx.send(AudioChunk {
            samples: vec![0.4; 96_000],
            sample_rate: 48_000,
            channels: 2,
        })
        .unwrap();
        tx.send(chunk(0.0, 8_000)).unwrap();

        let utt = collect_utterance(&rx, &config()).unwrap();
        assert_eq!(utt.endpoint, Endpoint::SpeechEnded);
        assert!((utt.duration_secs() - 1.5).abs() < 0.01);
    }

    #[test]
    fn dropped_stream_is_an_error() {
        let (tx, rx) = mpsc::channel::<AudioChunk>();
        tx.send(chunk(0.4, 1_600)).unwrap();
        drop(tx);
        assert!(matches!(
            collect_utterance(&rx, &config()),
            Err(CaptureError::Disconnected)
        ));
    }
}
