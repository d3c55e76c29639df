//! User-visible notices.
//!
//! Every workflow reports through a [`Notifier`] instead of popping dialogs
//! directly.  [`NoticeBoard`] is the collecting implementation: the control
//! panel drains it each frame and tests assert on its contents.
//!
//! The message texts shown to the user are Brazilian Portuguese and live in
//! [`messages`].

use std::sync::{Mutex, PoisonError};

// ---------------------------------------------------------------------------
// Severity / Notice
// ---------------------------------------------------------------------------

/// How loudly a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Confirmation of a user action (e.g. a mode toggle).
    Info,
    /// A precondition was not met; the action was not attempted.
    Warning,
    /// Something failed after the action was attempted.
    Error,
}

/// A single message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifier trait
// ---------------------------------------------------------------------------

/// Sink for user-visible notices.
///
/// Implementors must be `Send + Sync`; workflows hold them as
/// `Arc<dyn Notifier>` and call them from tokio tasks.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::new(Severity::Info, message));
    }

    fn warn(&self, message: &str) {
        self.notify(Notice::new(Severity::Warning, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::new(Severity::Error, message));
    }
}

// ---------------------------------------------------------------------------
// NoticeBoard
// ---------------------------------------------------------------------------

/// Collects notices in arrival order until someone drains them.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    pending: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending notice.
    pub fn drain(&self) -> Vec<Notice> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }

    /// Copy of the pending notices, leaving them in place.
    pub fn snapshot(&self) -> Vec<Notice> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages only, in order.  Mostly handy in assertions.
    pub fn messages(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|n| n.message).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => log::info!("notice: {}", notice.message),
            Severity::Warning => log::warn!("notice: {}", notice.message),
            Severity::Error => log::error!("notice: {}", notice.message),
        }
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

// ---------------------------------------------------------------------------
// Message catalogue
// ---------------------------------------------------------------------------

/// Fixed user-facing texts.
pub mod messages {
    pub const MISSING_IMAGE: &str = "Por favor, carregue ou cole uma imagem primeiro.";
    pub const MISSING_PROMPT: &str = "Por favor, insira um prompt.";
    pub const GENERATION_NO_URL: &str = "Falha ao gerar imagem. Nenhuma URL retornada.";
    pub const GENERATION_ERROR: &str =
        "Ocorreu um erro durante a geração da imagem. Por favor, tente novamente.";

    pub const PLATE_ON: &str = "Modo \"Ocultar Placa de Veículos\" ativado. A AI tentará remover ou borrar placas de veículos na imagem gerada.";
    pub const PLATE_OFF: &str = "Modo \"Ocultar Placa de Veículos\" desativado.";

    pub const NOTHING_TO_SAVE: &str = "Nenhuma imagem gerada para salvar.";
    pub const GALLERY_IN_DEVELOPMENT: &str = "A funcionalidade de \"Salvar Galeria Organizada\" está em desenvolvimento para agrupar múltiplas imagens editadas.";
    pub const SAVE_FAILED: &str = "Não foi possível salvar a imagem gerada.";

    pub const SPEECH_UNSUPPORTED_PROMPT: &str =
        "Reconhecimento de voz indisponível neste dispositivo. Por favor, digite o prompt.";
    pub const SPEECH_UNSUPPORTED_REPASS: &str = "Reconhecimento de voz indisponível neste dispositivo. Por favor, use um prompt de texto manual se necessário.";

    pub const REPASS_RETRY: &str = "Erro ao gerar detalhes do repasse. Certifique-se de que a descrição foi clara e tente novamente.";

    /// "saved to" confirmation.
    pub fn saved_to(path: &std::path::Path) -> String {
        format!("Imagem salva em {}", path.display())
    }

    pub fn speech_error(reason: &str) -> String {
        format!("Erro no reconhecimento de voz: {reason}")
    }

    pub fn repass_speech_error(reason: &str) -> String {
        format!("Erro no reconhecimento de voz para detalhes de repasse: {reason}")
    }

    /// Placeholder shown while the listing is being structured.
    pub fn repass_waiting(transcript: &str) -> String {
        format!("Aguardando análise da AI sobre: \"{transcript}\"...")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
