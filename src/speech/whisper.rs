//! Desktop speech recognizer: default microphone + local Whisper model.
//!
//! ```text
//! recognize()
//!   └─▶ spawn_blocking {
//!         record_utterance   (cpal, endpointing)
//!         trim_silence
//!         SttEngine::transcribe
//!       }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::{self, Microphone, Utterance};
use crate::config::{AppConfig, AppPaths, AudioConfig};

use super::engine::{SttEngine, WhisperEngine, MAX_AUDIO_SAMPLES, MIN_AUDIO_SAMPLES};
use super::model::{find_model_by_id, ModelPaths};
use super::recognizer::{RecognitionOptions, SpeechCapability, SpeechError, SpeechRecognizer};
use super::transcribe::TranscribeParams;

pub struct WhisperRecognizer {
    engine: Arc<dyn SttEngine>,
    audio: AudioConfig,
}

impl WhisperRecognizer {
    pub fn new(engine: Arc<dyn SttEngine>, audio: AudioConfig) -> Self {
        Self { engine, audio }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, options: &RecognitionOptions) -> Result<Option<String>, SpeechError> {
        log::debug!("speech: listening ({})", options.language());
        let engine = Arc::clone(&self.engine);
        let audio = self.audio.clone();

        tokio::task::spawn_blocking(move || {
            let utterance = audio::record_utterance(&audio)?;
            transcribe_utterance(engine.as_ref(), &utterance, audio.vad_threshold)
        })
        .await
        .map_err(|e| SpeechError::Worker(e.to_string()))?
    }
}

/// Turn a recorded utterance into a transcript; `None` when it holds no
/// speech.
pub fn transcribe_utterance(
    engine: &dyn SttEngine,
    utterance: &Utterance,
    vad_threshold: f32,
) -> Result<Option<String>, SpeechError> {
    if utterance.is_silent() {
        return Ok(None);
    }
    let Some(clip) = prepare_clip(&utterance.samples, vad_threshold) else {
        return Ok(None);
    };

    let text = engine.transcribe(&clip)?;
    Ok(clean_transcript(&text))
}

/// Trim silence and fit the clip into the engine's length window.
pub fn prepare_clip(samples: &[f32], vad_threshold: f32) -> Option<Vec<f32>> {
    let speech = audio::trim_silence(samples, vad_threshold);
    if speech.is_empty() {
        return None;
    }
    let mut clip = speech[..speech.len().min(MAX_AUDIO_SAMPLES)].to_vec();
    if clip.len() < MIN_AUDIO_SAMPLES {
        clip.resize(MIN_AUDIO_SAMPLES, 0.0);
    }
    Some(clip)
}

/// Whisper marks non-speech with bracketed tags such as `[BLANK_AUDIO]`.
fn clean_transcript(text: &str) -> Option<String> {
    let text = text.trim();
    let is_tag = text.starts_with('[') && text.ends_with(']');
    (!text.is_empty() && !is_tag).then(|| text.to_string())
}

// ---------------------------------------------------------------------------
// Capability detection
// ---------------------------------------------------------------------------

/// Decide once whether dictation is available on this machine.
pub fn detect_capability(config: &AppConfig, paths: &AppPaths) -> SpeechCapability {
    if !config.speech.enabled {
        return SpeechCapability::unsupported("speech recognition disabled in settings");
    }

    let model_path = ModelPaths::from_app_paths(paths).resolve(&config.speech);
    if !model_path.exists() {
        log::warn!("speech: model file not found at {}", model_path.display());
        if let Some(model) = find_model_by_id(&config.speech.model) {
            log::warn!("speech: download {}", model.download_hint());
        }
        return SpeechCapability::unsupported(format!(
            "model file not found: {}",
            model_path.display()
        ));
    }

    if !Microphone::is_available() {
        log::warn!("speech: no input device");
        return SpeechCapability::unsupported("no input device");
    }

    let params = TranscribeParams::for_options(&RecognitionOptions::default());
    match WhisperEngine::load(&model_path, params, config.speech.use_gpu) {
        Ok(engine) => SpeechCapability::Supported(Arc::new(WhisperRecognizer::new(
            Arc::new(engine),
            config.audio.clone(),
        ))),
        Err(e) => {
            log::warn!("speech: {e}");
            SpeechCapability::unsupported(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Endpoint;
    use crate::speech::engine::{MockSttEngine, SttError};

    fn utterance(samples: Vec<f32>, endpoint: Endpoint) -> Utterance {
        Utterance { samples, endpoint }
    }

    fn speech_then_silence() -> Vec<f32> {
        let mut v = vec![0.0; 4_800];
        v.extend(vec![0.4; 3_200]);
        v.extend(vec![0.0; 4_800]);
        v
    }

    #[test]
    fn short_speech_is_padded_to_minimum() {
        let clip = prepare_clip(&speech_then_silence(), 0.01).unwrap();
        assert_eq!(clip.len(), MIN_AUDIO_SAMPLES);
        assert!((clip[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn silent_samples_give_no_clip() {
        assert!(prepare_clip(&vec![0.0; 16_000], 0.01).is_none());
    }

    #[test]
    fn no_speech_endpoint_skips_engine() {
        let engine = MockSttEngine::err(SttError::Transcription("must not run".into()));
        let utt = utterance(vec![0.0; 16_000], Endpoint::NoSpeech);
        assert_eq!(transcribe_utterance(&engine, &utt, 0.01).unwrap(), None);
    }

    #[test]
    fn transcript_is_trimmed() {
        let engine = MockSttEngine::ok("  Honda Civic 2018, prata  ");
        let utt = utterance(speech_then_silence(), Endpoint::SpeechEnded);
        assert_eq!(
            transcribe_utterance(&engine, &utt, 0.01).unwrap().as_deref(),
            Some("Honda Civic 2018, prata")
        );
    }

    #[test]
    fn blank_audio_tag_is_no_speech() {
        let engine = MockSttEngine::ok("[BLANK_AUDIO]");
        let utt = utterance(speech_then_silence(), Endpoint::MaxDuration);
        assert_eq!(transcribe_utterance(&engine, &utt, 0.01).unwrap(), None);
    }

    #[test]
    fn engine_failure_is_recognition_error() {
        let engine = MockSttEngine::err(SttError::Transcription("boom".into()));
        let utt = utterance(speech_then_silence(), Endpoint::SpeechEnded);
        assert!(matches!(
            transcribe_utterance(&engine, &utt, 0.01),
            Err(SpeechError::Recognition(_))
        ));
    }

    #[test]
    fn disabled_speech_is_unsupported() {
        let mut config = AppConfig::default();
        config.speech.enabled = false;
        let cap = detect_capability(&config, &AppPaths::new());
        assert!(!cap.is_supported());
    }

    #[test]
    fn missing_model_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = AppPaths::new();
        paths.models_dir = dir.path().to_path_buf();
        let cap = detect_capability(&AppConfig::default(), &paths);
        match cap {
            SpeechCapability::Unsupported { reason } => assert!(reason.contains("model")),
            SpeechCapability::Supported(_) => panic!("expected unsupported"),
        }
    }
}
