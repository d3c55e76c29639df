//! User-triggered workflows.
//!
//! * [`generate`]: submit image + prompt, show the result.
//! * [`repass`]: structure a dictated description into a listing.
//! * [`dictation`]: prompt and repass microphones.

pub mod dictation;
pub mod generate;
pub mod repass;

pub use dictation::{Dictation, DictationOutcome};
pub use generate::{build_prompt, GenerationWorkflow, SubmitOutcome, PLATE_OBFUSCATION_SUFFIX};
pub use repass::{RepassOutcome, RepassWorkflow, MIN_VISIBLE};
