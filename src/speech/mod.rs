//! Dictation.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ VoiceCapture ── SpeechCapability ──▶ dyn SpeechRecognizer   │
//! │   (indicator guard,                    │                    │
//! │    CaptureOutcome)                     ▼                    │
//! │                               WhisperRecognizer             │
//! │                          audio::record_utterance            │
//! │                          SttEngine (WhisperEngine)          │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod engine;
pub mod model;
pub mod recognizer;
pub mod transcribe;
pub mod whisper;

pub use capture::{CaptureOutcome, VoiceCapture};
pub use engine::{SttEngine, SttError, WhisperEngine};
pub use model::{find_model_by_id, ModelInfo, ModelPaths, WHISPER_MODELS};
pub use recognizer::{
    RecognitionOptions, RecordingIndicator, SpeechCapability, SpeechError, SpeechRecognizer,
    RECOGNITION_LOCALE,
};
pub use transcribe::{SamplingStrategy, Segment, TranscribeParams, TranscriptionResult};
pub use whisper::{detect_capability, WhisperRecognizer};

#[cfg(test)]
pub use engine::MockSttEngine;
