//! Shared studio state.
//!
//! [`StudioState`] is the single source of truth for the control panel:
//! input sources, drag affordance, prompt, plate-obfuscation flag, the
//! generation result and the repass panel.  Workflows mutate it; the egui
//! update loop reads it each frame.
//!
//! [`SharedSession`] is `Arc<Mutex<StudioState>>`.  Each test builds its own
//! instance with [`new_shared_session`]; nothing is global.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::drag::DragTracker;
use super::input::InputSources;
use crate::speech::RecordingIndicator;

/// Placeholder URL that never counts as a displayed result.
pub const RESULT_PLACEHOLDER: &str = "#";

// ---------------------------------------------------------------------------
// Generation view
// ---------------------------------------------------------------------------

/// Image returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub url: String,
}

/// Generation trigger, loading indicator and result view.
#[derive(Debug, Default, Clone)]
pub struct GenerationView {
    /// A request is outstanding; the trigger is disabled.
    pub in_flight: bool,
    /// Loading indicator visibility.
    pub loading: bool,
    pub result: Option<GenerationResult>,
    pub result_visible: bool,
}

impl GenerationView {
    /// URL of the displayed result, when it is a real one.
    pub fn displayed_url(&self) -> Option<&str> {
        if !self.result_visible {
            return None;
        }
        self.result
            .as_ref()
            .map(|r| r.url.as_str())
            .filter(|url| !url.is_empty() && *url != RESULT_PLACEHOLDER)
    }
}

// ---------------------------------------------------------------------------
// Repass view
// ---------------------------------------------------------------------------

/// Output panel of the listing structurer.
#[derive(Debug, Default, Clone)]
pub struct RepassView {
    pub visible: bool,
    pub text: String,
    /// A structuring request is outstanding.
    pub busy: bool,
}

// ---------------------------------------------------------------------------
// StudioState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StudioState {
    pub inputs: InputSources,
    pub drag: DragTracker,
    /// Prompt field text.
    pub prompt: String,
    pub plate_obfuscation: bool,
    pub generation: GenerationView,
    pub repass: RepassView,
    /// Recording indicator of the prompt microphone.
    pub prompt_recording: bool,
    /// Recording indicator of the repass microphone.
    pub repass_recording: bool,
}

impl StudioState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently displayed, valid result URL.
    pub fn current_result(&self) -> Option<&str> {
        self.generation.displayed_url()
    }

    /// `true` while either microphone is recording.
    pub fn is_recording(&self) -> bool {
        self.prompt_recording || self.repass_recording
    }

    /// `true` while something asynchronous is visibly in progress.
    pub fn is_busy(&self) -> bool {
        self.generation.in_flight || self.repass.busy || self.is_recording()
    }
}

// ---------------------------------------------------------------------------
// SharedSession
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`StudioState`].
///
/// Lock with [`lock_session`] for a short critical section; do **not** hold
/// the guard across `.await` points.
pub type SharedSession = Arc<Mutex<StudioState>>;

pub fn new_shared_session() -> SharedSession {
    Arc::new(Mutex::new(StudioState::new()))
}

/// Lock the session, recovering the state if a previous holder panicked.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, StudioState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Microphone indicators
// ---------------------------------------------------------------------------

/// Which dictation trigger a capture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mic {
    Prompt,
    Repass,
}

/// Drives one of the two recording indicators in the session.
pub struct MicIndicator {
    session: SharedSession,
    mic: Mic,
}

impl MicIndicator {
    pub fn new(session: SharedSession, mic: Mic) -> Self {
        Self { session, mic }
    }
}

impl RecordingIndicator for MicIndicator {
    fn set_recording(&self, recording: bool) {
        let mut st = lock_session(&self.session);
        match self.mic {
            Mic::Prompt => st.prompt_recording = recording,
            Mic::Repass => st.repass_recording = recording,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
