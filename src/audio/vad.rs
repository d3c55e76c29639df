//! Energy-based voice activity detection.
//!
//! Audio is judged in 30 ms frames (480 samples at 16 kHz); a frame is voice
//! when its RMS exceeds the threshold.
//!
//! * [`trim_silence`] cuts leading and trailing silence before inference so
//!   Whisper does not hallucinate on quiet tails.
//! * [`EndpointDetector`] watches a live stream and decides when an
//!   utterance is over.

use crate::config::AudioConfig;

use super::resample::WHISPER_SAMPLE_RATE;

/// 30 ms at 16 kHz.
pub const FRAME_SIZE: usize = 480;

fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

fn is_voice(frame: &[f32], threshold: f32) -> bool {
    rms(frame) > threshold
}

/// Trim leading and trailing silence.  Returns a sub-slice; an all-silent
/// clip yields an empty slice.
pub fn trim_silence(audio: &[f32], threshold: f32) -> &[f32] {
    let frames: Vec<&[f32]> = audio.chunks(FRAME_SIZE).collect();

    let Some(first) = frames.iter().position(|f| is_voice(f, threshold)) else {
        return &audio[0..0];
    };
    let last = frames
        .iter()
        .rposition(|f| is_voice(f, threshold))
        .unwrap_or(first);

    let start = first * FRAME_SIZE;
    let end = ((last + 1) * FRAME_SIZE).min(audio.len());
    &audio[start..end]
}

// ---------------------------------------------------------------------------
// EndpointDetector
// ---------------------------------------------------------------------------

/// Verdict after feeding more audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Keep recording.
    Continue,
    /// Speech was heard and has been followed by enough silence.
    SpeechEnded,
    /// Nothing but silence until the no-speech timeout.
    NoSpeech,
    /// Hard cap reached.
    MaxDuration,
}

/// Decides when a live utterance is finished.
///
/// ```text
/// silence … voice voice … silence ≥ end_silence  → SpeechEnded
/// silence ≥ no_speech_timeout (no voice yet)     → NoSpeech
/// total ≥ max_duration                           → MaxDuration
/// ```
#[derive(Debug, Clone)]
pub struct EndpointDetector {
    threshold: f32,
    end_silence: usize,
    no_speech: usize,
    max_total: usize,
    /// Samples not yet forming a whole frame.
    pending: Vec<f32>,
    seen: usize,
    silence_run: usize,
    speech_started: bool,
}

impl EndpointDetector {
    pub fn new(config: &AudioConfig) -> Self {
        let rate = WHISPER_SAMPLE_RATE as f32;
        Self {
            threshold: config.vad_threshold,
            end_silence: (config.end_silence_ms as f32 / 1000.0 * rate) as usize,
            no_speech: (config.no_speech_timeout_secs * rate) as usize,
            max_total: (config.max_recording_secs * rate) as usize,
            pending: Vec::with_capacity(FRAME_SIZE),
            seen: 0,
            silence_run: 0,
            speech_started: false,
        }
    }

    /// Whether any voice frame has been seen.
    pub fn speech_started(&self) -> bool {
        self.speech_started
    }

    /// Feed 16 kHz mono samples.
    pub fn push(&mut self, samples: &[f32]) -> Endpoint {
        self.pending.extend_from_slice(samples);

        let whole = self.pending.len() / FRAME_SIZE * FRAME_SIZE;
        let frames: Vec<f32> = self.pending.drain(..whole).collect();

        for frame in frames.chunks(FRAME_SIZE) {
            self.seen += frame.len();
            if is_voice(frame, self.threshold) {
                self.speech_started = true;
                self.silence_run = 0;
            } else if self.speech_started {
                self.silence_run += frame.len();
            }

            if self.speech_started && self.silence_run >= self.end_silence {
                return Endpoint::SpeechEnded;
            }
            if !self.speech_started && self.seen >= self.no_speech {
                return Endpoint::NoSpeech;
            }
            if self.seen >= self.max_total {
                return Endpoint::MaxDuration;
            }
        }
        Endpoint::Continue
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
