//! Whisper model registry and on-disk paths.
//!
//! Only the multilingual models are listed: they all cover Portuguese.

use std::path::PathBuf;

use crate::config::{AppPaths, SpeechConfig};

/// Static metadata for one GGML model file.
#[derive(Debug)]
pub struct ModelInfo {
    /// Value of `speech.model` in `settings.toml`.
    pub id: &'static str,
    pub display_name: &'static str,
    pub file_name: &'static str,
    pub file_size_mb: u64,
    pub ram_required_mb: u64,
    pub source_url: &'static str,
}

pub const WHISPER_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "whisper-base",
        display_name: "Whisper Base",
        file_name: "ggml-base.bin",
        file_size_mb: 142,
        ram_required_mb: 500,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "whisper-small",
        display_name: "Whisper Small [Recommended]",
        file_name: "ggml-small.bin",
        file_size_mb: 466,
        ram_required_mb: 1_000,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "whisper-medium",
        display_name: "Whisper Medium",
        file_name: "ggml-medium.bin",
        file_size_mb: 1_500,
        ram_required_mb: 3_000,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "whisper-large-v3",
        display_name: "Whisper Large-v3",
        file_name: "ggml-large-v3.bin",
        file_size_mb: 3_100,
        ram_required_mb: 6_000,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
];

impl ModelInfo {
    /// What to fetch, and how heavy it is, when the file is absent.
    pub fn download_hint(&self) -> String {
        format!(
            "{} ({}, {} MB on disk, ~{} MB RAM) from {}",
            self.display_name,
            self.file_name,
            self.file_size_mb,
            self.ram_required_mb,
            self.source_url
        )
    }
}

pub fn find_model_by_id(id: &str) -> Option<&'static ModelInfo> {
    WHISPER_MODELS.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub models_dir: PathBuf,
}

impl ModelPaths {
    pub fn from_app_paths(app_paths: &AppPaths) -> Self {
        Self::new(app_paths.models_dir.clone())
    }

    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    pub fn model_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir.join(model.file_name)
    }

    pub fn is_available(&self, model: &ModelInfo) -> bool {
        self.model_path(model).exists()
    }

    /// Path of the configured model.  An id that is not in the registry is
    /// taken as a file name under the models directory.
    pub fn resolve(&self, speech: &SpeechConfig) -> PathBuf {
        match find_model_by_id(&speech.model) {
            Some(model) => self.model_path(model),
            None => self.models_dir.join(&speech.model),
        }
    }
}
