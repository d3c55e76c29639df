//! Voice Capture Adapter.
//!
//! Runs one recognition session and reduces it to a [`CaptureOutcome`].
//! The recording indicator is on for the whole session and is switched off
//! by a guard, so it also goes off on error or when the future is dropped.

use super::recognizer::{
    RecognitionOptions, RecordingIndicator, SpeechCapability, SpeechError,
};

/// Result of a recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Recognized(String),
    NoSpeech,
    Failed(String),
}

/// Dictation entry point shared by the prompt and repass microphones.
#[derive(Debug, Clone)]
pub struct VoiceCapture {
    capability: SpeechCapability,
    options: RecognitionOptions,
}

impl VoiceCapture {
    pub fn new(capability: SpeechCapability) -> Self {
        Self {
            capability,
            options: RecognitionOptions::default(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capability.is_supported()
    }

    /// Run one session.  Only an absent recognizer is an `Err`; every
    /// recognition problem comes back as [`CaptureOutcome::Failed`].
    pub async fn capture(
        &self,
        indicator: &dyn RecordingIndicator,
    ) -> Result<CaptureOutcome, SpeechError> {
        let recognizer = match &self.capability {
            SpeechCapability::Supported(r) => r,
            SpeechCapability::Unsupported { reason } => {
                log::warn!("speech: capture requested but unsupported ({reason})");
                return Err(SpeechError::NotSupported(reason.clone()));
            }
        };

        let _guard = IndicatorGuard::on(indicator);
        log::debug!("speech: session started ({})", self.options.locale);

        let outcome = match recognizer.recognize(&self.options).await {
            Ok(Some(transcript)) => CaptureOutcome::Recognized(transcript),
            Ok(None) => CaptureOutcome::NoSpeech,
            Err(e) => {
                log::error!("speech: recognition failed: {e}");
                CaptureOutcome::Failed(e.to_string())
            }
        };
        log::debug!("speech: session ended");
        Ok(outcome)
    }
}

struct IndicatorGuard<'a>(&'a dyn RecordingIndicator);

impl<'a> IndicatorGuard<'a> {
    fn on(indicator: &'a dyn RecordingIndicator) -> Self {
        indicator.set_recording(true);
        Self(indicator)
    }
}

impl Drop for IndicatorGuard<'_> {
    fn drop(&mut self) {
        self.0.set_recording(false);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
