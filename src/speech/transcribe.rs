//! Whisper inference parameters and results.

use super::recognizer::RecognitionOptions;

/// Owned mirror of `whisper_rs::SamplingStrategy`.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    Greedy { best_of: i32 },
    BeamSearch { beam_size: i32, patience: f32 },
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Greedy { best_of: 1 }
    }
}

/// Settings for one Whisper run.
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 code, or `"auto"`.
    pub language: String,
    pub strategy: SamplingStrategy,
    pub n_threads: i32,
    /// Keep whisper.cpp quiet on stderr.
    pub suppress_progress: bool,
    /// Single final hypothesis without timestamps.
    pub no_timestamps: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self::for_options(&RecognitionOptions::default())
    }
}

impl TranscribeParams {
    /// Parameters matching a recognition request: its language, and a
    /// single greedy hypothesis since only one alternative is wanted.
    pub fn for_options(options: &RecognitionOptions) -> Self {
        let best_of = options.max_alternatives.max(1) as i32;
        Self {
            language: options.language().to_string(),
            strategy: SamplingStrategy::Greedy { best_of },
            n_threads: optimal_threads(),
            suppress_progress: true,
            no_timestamps: !options.interim_results,
        }
    }
}

/// Physical threads for inference, capped at 8.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// Concatenated, trimmed text.
    pub text: String,
    pub segments: Vec<Segment>,
    /// Wall-clock inference time.
    pub duration_ms: u128,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}
