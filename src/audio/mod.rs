//! Microphone capture for dictation.
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → downmix + resample 16 kHz
//!            → EndpointDetector (stop on trailing silence / timeout)
//!            → trim_silence → Whisper
//! ```

pub mod capture;
pub mod recorder;
pub mod resample;
pub mod vad;

pub use capture::{AudioChunk, CaptureError, Microphone, StreamHandle};
pub use recorder::{collect_utterance, record_utterance, Utterance};
pub use resample::{downmix, resample_to_16k, to_whisper_input, WHISPER_SAMPLE_RATE};
pub use vad::{trim_silence, Endpoint, EndpointDetector};
