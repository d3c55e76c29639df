//! Window-level paste shortcut.
//!
//! egui only reports Ctrl/Cmd+V when the clipboard holds text, and swallows
//! the key event otherwise, so an image-only clipboard never reaches the
//! frame.  [`PasteChordListener`] watches the chord at OS level with
//! `rdev::listen` on its own thread; [`PasteGate`] merges that with egui's own
//! signals and decides once per frame whether to paste.
//!
//! `rdev::listen` cannot be stopped.  Dropping the listener sets a flag so the
//! callback discards further events; the thread stays blocked until exit.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

/// Signals of one chord closer together than this are the same gesture.
pub const PASTE_DEBOUNCE: Duration = Duration::from_millis(300);

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// What one frame saw that could mean "paste".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteSignals {
    /// egui delivered `Event::Paste` (text clipboards only).
    pub text_paste_event: bool,
    /// egui delivered a Cmd/Ctrl+V key press.
    pub key_chord: bool,
    /// The OS-level listener saw Cmd/Ctrl+V.
    pub global_chord: bool,
    /// The window has keyboard focus.
    pub window_focused: bool,
    /// A text widget has focus and handles the paste itself.
    pub widget_focused: bool,
}

/// Turns per-frame signals into at most one paste per gesture.
#[derive(Debug, Default)]
pub struct PasteGate {
    last: Option<Instant>,
}

impl PasteGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_paste(&mut self, signals: PasteSignals, now: Instant) -> bool {
        if signals.widget_focused {
            return false;
        }
        let local = signals.text_paste_event || signals.key_chord;
        let global = signals.global_chord && signals.window_focused;
        if !(local || global) {
            return false;
        }

        // egui and the OS listener both report a text paste.
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < PASTE_DEBOUNCE {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

// ---------------------------------------------------------------------------
// Chord tracking
// ---------------------------------------------------------------------------

/// Modifier state fed by raw key events.
#[derive(Debug, Default, Clone)]
pub struct ChordTracker {
    control: bool,
    meta: bool,
}

impl ChordTracker {
    /// Returns `true` when `event` completes Ctrl+V or Cmd+V.
    pub fn on_event(&mut self, event: &rdev::EventType) -> bool {
        match event {
            rdev::EventType::KeyPress(key) => match key {
                rdev::Key::ControlLeft | rdev::Key::ControlRight => {
                    self.control = true;
                    false
                }
                rdev::Key::MetaLeft | rdev::Key::MetaRight => {
                    self.meta = true;
                    false
                }
                rdev::Key::KeyV => self.control || self.meta,
                _ => false,
            },
            rdev::EventType::KeyRelease(key) => {
                match key {
                    rdev::Key::ControlLeft | rdev::Key::ControlRight => self.control = false,
                    rdev::Key::MetaLeft | rdev::Key::MetaRight => self.meta = false,
                    _ => {}
                }
                false
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// PasteChordListener
// ---------------------------------------------------------------------------

/// Handle to the OS-level chord listener thread.
pub struct PasteChordListener {
    stop: Arc<AtomicBool>,
    chords: mpsc::Receiver<()>,
    _thread: std::thread::JoinHandle<()>,
}

impl PasteChordListener {
    /// Spawn the listener.  Each chord wakes `ctx` so the next frame sees it.
    pub fn start(ctx: egui::Context) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);
        let (tx, chords) = mpsc::channel(4);

        let thread = std::thread::Builder::new()
            .name("paste-listener".into())
            .spawn(move || {
                let mut tracker = ChordTracker::default();
                let result = rdev::listen(move |event| {
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }
                    if tracker.on_event(&event.event_type) {
                        // A full queue already holds a pending chord.
                        let _ = tx.try_send(());
                        ctx.request_repaint();
                    }
                });

                if let Err(e) = result {
                    log::error!("paste-listener: rdev::listen exited with error: {e:?}");
                }
            })?;

        Ok(Self {
            stop,
            chords,
            _thread: thread,
        })
    }

    /// `true` if at least one chord arrived since the last call.
    pub fn take_chord(&mut self) -> bool {
        let mut seen = false;
        while self.chords.try_recv().is_ok() {
            seen = true;
        }
        seen
    }
}

impl Drop for PasteChordListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
