//! Speech recognition seam.
//!
//! [`SpeechRecognizer`] is the platform facility behind dictation.  Whether
//! one exists is decided once at startup and captured in
//! [`SpeechCapability`]; callers never query the platform again.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::CaptureError;

use super::engine::SttError;

/// Recognition locale.  Fixed; dictation is always Brazilian Portuguese.
pub const RECOGNITION_LOCALE: &str = "pt-BR";

// ---------------------------------------------------------------------------
// RecognitionOptions
// ---------------------------------------------------------------------------

/// Options for a single recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub locale: String,
    /// Only the final result is delivered.
    pub interim_results: bool,
    /// Only the best hypothesis is delivered.
    pub max_alternatives: u32,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            locale: RECOGNITION_LOCALE.to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

impl RecognitionOptions {
    /// ISO-639-1 language code of the locale (`"pt-BR"` → `"pt"`).
    pub fn language(&self) -> &str {
        self.locale
            .split(['-', '_'])
            .next()
            .unwrap_or(&self.locale)
    }
}

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SpeechError {
    /// No recognizer on this device.
    #[error("speech recognition not supported: {0}")]
    NotSupported(String),

    /// The microphone could not be opened or stopped delivering audio.
    #[error("audio-capture: {0}")]
    Audio(#[from] CaptureError),

    /// The recognizer itself failed.
    #[error("recognition: {0}")]
    Recognition(#[from] SttError),

    /// The blocking worker panicked or was cancelled.
    #[error("worker: {0}")]
    Worker(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A platform speech recognizer.
///
/// `Ok(None)` means the session ended without any speech.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, options: &RecognitionOptions) -> Result<Option<String>, SpeechError>;
}

/// Something that shows whether a microphone is live.
pub trait RecordingIndicator: Send + Sync {
    fn set_recording(&self, recording: bool);
}

// ---------------------------------------------------------------------------
// SpeechCapability
// ---------------------------------------------------------------------------

/// Whether dictation is available, decided once.
#[derive(Clone)]
pub enum SpeechCapability {
    Supported(Arc<dyn SpeechRecognizer>),
    Unsupported { reason: String },
}

impl SpeechCapability {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

impl std::fmt::Debug for SpeechCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supported(_) => f.write_str("Supported"),
            Self::Unsupported { reason } => f
                .debug_struct("Unsupported")
                .field("reason", reason)
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
