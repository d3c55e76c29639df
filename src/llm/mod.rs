//! Chat-completion plumbing for the listing structurer.
//!
//! * [`ChatCompleter`]: async trait over an OpenAI-compatible chat endpoint.
//! * [`ApiCompleter`]: the HTTP implementation.
//! * [`listing`]: prompt, strict parsing and rendering of a
//!   [`ListingDraft`].

pub mod completion;
pub mod listing;

pub use completion::{ApiCompleter, ChatCompleter, ChatMessage, CompletionRequest, LlmError, Role};
pub use listing::ListingDraft;
