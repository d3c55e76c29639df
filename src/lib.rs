//! Vehicle Studio: a control panel for AI editing of vehicle photos.
//!
//! The library holds everything except process startup: acquisition of the
//! source image, dictation, the two remote workflows, output actions and the
//! `eframe` shell that ties them to a window.

pub mod app;
pub mod audio;
pub mod config;
pub mod generation;
pub mod llm;
pub mod media;
pub mod notify;
pub mod output;
pub mod session;
pub mod speech;
pub mod workflow;
