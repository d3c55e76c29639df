//! Microphone triggers.
//!
//! * prompt mic: the transcript replaces the prompt text;
//! * repass mic: the transcript is handed to [`RepassWorkflow::structure`].

use std::sync::Arc;

use crate::notify::{messages, Notifier};
use crate::session::{lock_session, Mic, MicIndicator, SharedSession};
use crate::speech::{CaptureOutcome, SpeechError, VoiceCapture};

use super::repass::RepassWorkflow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationOutcome {
    /// That microphone is already recording.
    Busy,
    Unsupported,
    Captured(CaptureOutcome),
}

pub struct Dictation {
    session: SharedSession,
    capture: VoiceCapture,
    repass: Arc<RepassWorkflow>,
    notifier: Arc<dyn Notifier>,
}

impl Dictation {
    pub fn new(
        session: SharedSession,
        capture: VoiceCapture,
        repass: Arc<RepassWorkflow>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            capture,
            repass,
            notifier,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capture.is_supported()
    }

    pub async fn dictate_prompt(&self) -> DictationOutcome {
        let outcome = match self.listen(Mic::Prompt).await {
            Listened::Busy => return DictationOutcome::Busy,
            Listened::Unsupported => {
                self.notifier.warn(messages::SPEECH_UNSUPPORTED_PROMPT);
                return DictationOutcome::Unsupported;
            }
            Listened::Outcome(outcome) => outcome,
        };

        match &outcome {
            CaptureOutcome::Recognized(transcript) => {
                lock_session(&self.session).prompt = transcript.clone();
            }
            CaptureOutcome::Failed(reason) => {
                self.notifier.error(&messages::speech_error(reason));
            }
            CaptureOutcome::NoSpeech => {}
        }
        DictationOutcome::Captured(outcome)
    }

    pub async fn dictate_repass(&self) -> DictationOutcome {
        let outcome = match self.listen(Mic::Repass).await {
            Listened::Busy => return DictationOutcome::Busy,
            Listened::Unsupported => {
                self.notifier.warn(messages::SPEECH_UNSUPPORTED_REPASS);
                return DictationOutcome::Unsupported;
            }
            Listened::Outcome(outcome) => outcome,
        };

        match &outcome {
            CaptureOutcome::Recognized(transcript) => {
                self.repass.structure(transcript).await;
            }
            CaptureOutcome::Failed(reason) => {
                self.notifier.error(&messages::repass_speech_error(reason));
                lock_session(&self.session).repass.visible = false;
            }
            CaptureOutcome::NoSpeech => {}
        }
        DictationOutcome::Captured(outcome)
    }

    async fn listen(&self, mic: Mic) -> Listened {
        {
            let st = lock_session(&self.session);
            let recording = match mic {
                Mic::Prompt => st.prompt_recording,
                Mic::Repass => st.repass_recording,
            };
            if recording {
                return Listened::Busy;
            }
        }

        let indicator = MicIndicator::new(Arc::clone(&self.session), mic);
        match self.capture.capture(&indicator).await {
            Ok(outcome) => Listened::Outcome(outcome),
            Err(SpeechError::NotSupported(_)) => Listened::Unsupported,
            Err(e) => Listened::Outcome(CaptureOutcome::Failed(e.to_string())),
        }
    }
}

enum Listened {
    Busy,
    Unsupported,
    Outcome(CaptureOutcome),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
