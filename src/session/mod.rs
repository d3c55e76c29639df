//! Session: input sources, drag affordance and the shared studio state.
//!
//! * [`input`]: the single current [`ImageSource`] and its channels.
//! * [`drag`]: nested drag-enter/leave counting.
//! * [`acquire`]: async handlers for picker, URL, drop and paste events.
//! * [`state`]: [`StudioState`] behind [`SharedSession`].

pub mod acquire;
pub mod drag;
pub mod input;
pub mod state;

pub use acquire::AcquireOutcome;
pub use drag::DragTracker;
pub use input::{is_accepted_url, AcquisitionTicket, ImageSource, InputSources};
pub use state::{
    lock_session, new_shared_session, GenerationResult, GenerationView, Mic, MicIndicator,
    RepassView, SharedSession, StudioState,
};
